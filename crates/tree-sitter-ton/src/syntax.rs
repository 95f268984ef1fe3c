//! Syntax diagnostics over parsed trees.

use std::{
    fmt::{self, Debug},
    iter::FusedIterator,
    ops::Range,
};

use serde::Serialize;
use tree_sitter::{Node, Point, Tree, TreeCursor};

/// Iterating over every node of a [`Tree`].
pub trait TreeIter {
    /// Returns an iterator over all nodes in the tree in pre-order.
    fn iter(&self) -> TreeIterator<'_>;
}

impl TreeIter for Tree {
    fn iter(&self) -> TreeIterator<'_> {
        let node_count = self.root_node().descendant_count();
        TreeIterator {
            descendant_indices: 0..node_count,
            cursor: self.walk(),
        }
    }
}

/// Pre-order iterator produced by [`TreeIter::iter`].
pub struct TreeIterator<'tree> {
    descendant_indices: Range<usize>,
    cursor: TreeCursor<'tree>,
}

impl Debug for TreeIterator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeIterator")
            .field("indices", &self.descendant_indices)
            .finish()
    }
}

impl<'tree> Iterator for TreeIterator<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.descendant_indices.next()?;
        self.cursor.goto_descendant(idx);
        Some(self.cursor.node())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.descendant_indices.size_hint()
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        let idx = self.descendant_indices.nth(n)?;
        self.cursor.goto_descendant(idx);
        Some(self.cursor.node())
    }
}

impl ExactSizeIterator for TreeIterator<'_> {
    fn len(&self) -> usize {
        self.descendant_indices.len()
    }
}

impl FusedIterator for TreeIterator<'_> {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(tag = "kind", content = "node", rename_all = "lowercase")]
pub enum IssueKind {
    #[display("syntax error")]
    Error,
    #[display("missing {_0}")]
    Missing(String),
}

/// A syntax error or a node inserted by error recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
#[display("{}:{}: {kind}", start.0 + 1, start.1 + 1)]
pub struct SyntaxIssue {
    pub kind: IssueKind,
    pub byte_range: Range<usize>,
    /// Zero-based row and column of the first byte.
    pub start: (usize, usize),
}

impl SyntaxIssue {
    fn new(kind: IssueKind, node: Node<'_>) -> Self {
        let Point { row, column } = node.start_position();
        Self {
            kind,
            byte_range: node.byte_range(),
            start: (row, column),
        }
    }
}

/// Lists the `ERROR` and missing nodes of `tree` in document order.
///
/// An `ERROR` node nested directly in another `ERROR` node over the same
/// bytes is reported once.
pub fn syntax_issues(tree: &Tree) -> Vec<SyntaxIssue> {
    if !tree.root_node().has_error() {
        return Vec::new();
    }
    tree.iter()
        .filter_map(|node| {
            if node.is_error() {
                if repeats_parent_error(node) {
                    return None;
                }
                Some(SyntaxIssue::new(IssueKind::Error, node))
            } else if node.is_missing() {
                Some(SyntaxIssue::new(IssueKind::Missing(node.kind().to_owned()), node))
            } else {
                None
            }
        })
        .collect()
}

fn repeats_parent_error(node: Node<'_>) -> bool {
    node.parent()
        .is_some_and(|parent| parent.is_error() && parent.byte_range() == node.byte_range())
}
