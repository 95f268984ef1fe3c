//! Typed definitions of the TON tree-sitter grammars.
//!
//! Grammars are written with the constructors in [`rules`], validated with
//! [`Grammar::validate`] and handed to the tree-sitter generator as
//! `grammar.json` via [`Grammar::to_json`].

mod grammar;

pub mod fift;
pub mod func;
pub mod header;
pub mod rules;

pub use grammar::{Grammar, GrammarError};
pub use rules::{Precedence, Rule};
