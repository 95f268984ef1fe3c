//! Runtime validation of the compiled language descriptors.
//!
//! The accessors are plain C functions, so nothing stops a mismatched or
//! stale object file from being linked. [`validate`] cross-checks a
//! descriptor against the grammar definition it was generated from and
//! against the tree-sitter runtime this crate was built with.

use serde::Serialize;
use tracing::{debug, info};
use tree_sitter::{LANGUAGE_VERSION, LanguageError, MIN_COMPATIBLE_LANGUAGE_VERSION, Parser};

use crate::Grammar;

/// Summary of a descriptor that passed [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorReport {
    pub grammar: Grammar,
    pub name: String,
    pub abi_version: usize,
    pub node_kind_count: usize,
    pub field_count: usize,
    pub parse_state_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("The {0} accessor returned a null descriptor")]
    Null(Grammar),
    #[error(
        "The {grammar} descriptor uses ABI version {version}, supported versions are {} to {}",
        MIN_COMPATIBLE_LANGUAGE_VERSION,
        LANGUAGE_VERSION
    )]
    IncompatibleVersion { grammar: Grammar, version: usize },
    #[error("The {grammar} descriptor is named {found:?}")]
    NameMismatch {
        grammar: Grammar,
        found: Option<String>,
    },
    #[error("The {grammar} descriptor has no named node kind {kind:?}")]
    MissingNodeKind { grammar: Grammar, kind: String },
    #[error("The {grammar} descriptor has no field {field:?}")]
    MissingField { grammar: Grammar, field: String },
    #[error("The parser rejected the {0} descriptor")]
    Rejected(Grammar, #[source] LanguageError),
}

/// Checks that the descriptor behind `grammar` is usable.
pub fn validate(grammar: Grammar) -> Result<DescriptorReport, DescriptorError> {
    if grammar.raw_descriptor().is_null() {
        return Err(DescriptorError::Null(grammar));
    }

    let language = grammar.language();
    let version = language.abi_version();
    if !(MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
        return Err(DescriptorError::IncompatibleVersion { grammar, version });
    }

    let name = language.name();
    if name != Some(grammar.name()) {
        return Err(DescriptorError::NameMismatch {
            grammar,
            found: name.map(str::to_owned),
        });
    }

    let definition = grammar.definition();
    if let Some(start_rule) = definition.start_rule() {
        if language.id_for_node_kind(start_rule, true) == 0 {
            return Err(DescriptorError::MissingNodeKind {
                grammar,
                kind: start_rule.to_owned(),
            });
        }
    }
    for field in definition.field_names() {
        if language.field_id_for_name(field).is_none() {
            return Err(DescriptorError::MissingField {
                grammar,
                field: field.to_owned(),
            });
        }
        debug!(%grammar, field, "Field resolved");
    }

    Parser::new()
        .set_language(language)
        .map_err(|err| DescriptorError::Rejected(grammar, err))?;

    let report = DescriptorReport {
        grammar,
        name: grammar.name().to_owned(),
        abi_version: version,
        node_kind_count: language.node_kind_count(),
        field_count: language.field_count(),
        parse_state_count: language.parse_state_count(),
    };
    info!(
        %grammar,
        abi_version = report.abi_version,
        node_kinds = report.node_kind_count,
        "Descriptor validated"
    );
    Ok(report)
}
