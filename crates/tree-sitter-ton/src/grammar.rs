#[cfg(any(feature = "fift", feature = "func"))]
use std::sync::LazyLock;
use std::{path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;
use tree_sitter::{Language, LanguageError, Parser, Query, QueryError, Tree};
use tree_sitter_language::LanguageFn;

/// The grammars compiled into this crate.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Grammar {
    #[cfg(feature = "fift")]
    Fift,
    #[cfg(feature = "func")]
    FunC,
}

#[cfg(feature = "fift")]
static FIFT: LazyLock<Language> = LazyLock::new(|| load(Grammar::Fift));

#[cfg(feature = "func")]
static FUNC: LazyLock<Language> = LazyLock::new(|| load(Grammar::FunC));

#[cfg(any(feature = "fift", feature = "func"))]
fn load(grammar: Grammar) -> Language {
    debug!(%grammar, symbol = grammar.accessor_symbol(), "Loading tree-sitter descriptor");
    Language::new(grammar.language_fn())
}

impl Grammar {
    pub const ALL: &[Self] = &[
        #[cfg(feature = "fift")]
        Self::Fift,
        #[cfg(feature = "func")]
        Self::FunC,
    ];

    /// The grammar name, which is also the suffix of its C accessor.
    pub const fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "fift")]
            Self::Fift => "fift",
            #[cfg(feature = "func")]
            Self::FunC => "func",
        }
    }

    /// The language identifier used by the Language Server Protocol
    pub const fn lsp_language_id(self) -> &'static str {
        self.name()
    }

    pub const fn file_extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "fift")]
            Self::Fift => &["fif"],
            #[cfg(feature = "func")]
            Self::FunC => &["fc", "func"],
        }
    }

    /// Picks the grammar matching the extension of `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        Self::ALL
            .iter()
            .copied()
            .find(|grammar| grammar.file_extensions().contains(&extension))
    }

    pub fn accessor_symbol(self) -> String {
        format!("tree_sitter_{}", self.name())
    }

    pub const fn language_fn(self) -> LanguageFn {
        match self {
            #[cfg(feature = "fift")]
            Self::Fift => crate::LANGUAGE_FIFT,
            #[cfg(feature = "func")]
            Self::FunC => crate::LANGUAGE_FUNC,
        }
    }

    /// The shared tree-sitter handle, created on first use.
    pub fn language(self) -> &'static Language {
        match self {
            #[cfg(feature = "fift")]
            Self::Fift => &FIFT,
            #[cfg(feature = "func")]
            Self::FunC => &FUNC,
        }
    }

    /// The descriptor pointer returned by the C accessor.
    pub fn raw_descriptor(self) -> *const () {
        let accessor = self.language_fn().into_raw();
        // SAFETY: the accessor is generated by tree-sitter. It takes no
        // arguments and returns a pointer to static data.
        unsafe { accessor() }
    }

    /// The grammar definition the parser was generated from.
    pub fn definition(self) -> ton_grammar::Grammar {
        match self {
            #[cfg(feature = "fift")]
            Self::Fift => ton_grammar::fift::grammar(),
            #[cfg(feature = "func")]
            Self::FunC => ton_grammar::func::grammar(),
        }
    }

    pub fn parser(self) -> Result<Parser, LanguageError> {
        let mut parser = Parser::new();
        parser.set_language(self.language())?;
        Ok(parser)
    }

    pub fn parse(self, source: impl AsRef<[u8]>) -> Result<Tree, ParseError> {
        let mut parser = self
            .parser()
            .map_err(|err| ParseError::Language(self, err))?;
        parser
            .parse(source, None)
            .ok_or(ParseError::Cancelled(self))
    }

    pub const fn highlights_query(self) -> &'static str {
        match self {
            #[cfg(feature = "fift")]
            Self::Fift => crate::FIFT_HIGHLIGHTS_QUERY,
            #[cfg(feature = "func")]
            Self::FunC => crate::FUNC_HIGHLIGHTS_QUERY,
        }
    }

    /// Query for tree-sitter syntax highlighting
    ///
    /// Capture names follow the common highlight groups, see
    /// [Neovim](https://neovim.io/doc/user/treesitter.html#treesitter-highlight-groups).
    pub fn ts_highlight_query(self) -> Result<Query, QueryError> {
        Query::new(self.language(), self.highlights_query())
    }
}

// Matched on `name()` rather than derived from the variant names, so both
// `func` and the display name `FunC` are accepted.
impl FromStr for Grammar {
    type Err = UnknownGrammar;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|grammar| grammar.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownGrammar(s.to_owned()))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown grammar {0:?}")]
pub struct UnknownGrammar(pub String);

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("The parser rejected the {0} language")]
    Language(Grammar, #[source] LanguageError),
    #[error("Parsing {0} source was cancelled")]
    Cancelled(Grammar),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "fift")]
    const FIFT_CODE: &str = include_str!("../fixtures/counter.fif");
    #[cfg(feature = "func")]
    const FUNC_CODE: &str = include_str!("../fixtures/counter.fc");

    #[test]
    fn unknown_paths_and_names() {
        assert_eq!(Grammar::from_path(Path::new("contract.tolk")), None);
        assert_eq!(Grammar::from_path(Path::new("Makefile")), None);
        assert!("tolk".parse::<Grammar>().is_err());
    }

    #[cfg(feature = "fift")]
    #[test]
    fn fift_from_path_and_name() {
        assert_eq!(Grammar::from_path(Path::new("out/counter.fif")), Some(Grammar::Fift));
        assert_eq!("fift".parse::<Grammar>().unwrap(), Grammar::Fift);
        assert_eq!("FIFT".parse::<Grammar>().unwrap(), Grammar::Fift);
    }

    #[cfg(feature = "func")]
    #[test]
    fn func_from_path_and_name() {
        assert_eq!(Grammar::from_path(Path::new("counter.fc")), Some(Grammar::FunC));
        assert_eq!(Grammar::from_path(Path::new("lib/stdlib.func")), Some(Grammar::FunC));
        assert_eq!("func".parse::<Grammar>().unwrap(), Grammar::FunC);
        assert_eq!("FunC".parse::<Grammar>().unwrap(), Grammar::FunC);
        assert_eq!(Grammar::FunC.to_string(), "FunC");
    }

    #[test]
    fn definitions_match_descriptors() {
        for &grammar in Grammar::ALL {
            let definition = grammar.definition();
            assert_eq!(definition.name(), grammar.name());
            assert_eq!(definition.accessor_symbol(), grammar.accessor_symbol());
            assert_eq!(grammar.language().name(), Some(grammar.name()));
        }
    }

    #[cfg(feature = "fift")]
    #[test]
    fn parse_fift_sample() {
        let tree = Grammar::Fift.parse(FIFT_CODE).unwrap();
        let root = tree.root_node();
        assert_eq!(root.kind(), "source_file");
        assert!(crate::syntax::syntax_issues(&tree).is_empty(), "{}", root.to_sexp());
        let sexp = root.to_sexp();
        for kind in ["include_directive", "program", "proc_definition", "if_statement", "proc_call"] {
            assert!(sexp.contains(kind), "{kind} not found in {sexp}");
        }
    }

    #[cfg(feature = "func")]
    #[test]
    fn parse_func_sample() {
        let tree = Grammar::FunC.parse(FUNC_CODE).unwrap();
        let root = tree.root_node();
        assert_eq!(root.kind(), "source_file");
        assert!(crate::syntax::syntax_issues(&tree).is_empty(), "{}", root.to_sexp());
        let sexp = root.to_sexp();
        for kind in [
            "import_directive",
            "pragma_directive",
            "constant_declarations",
            "global_var_declarations",
            "function_declaration",
            "if_statement",
            "method_call",
        ] {
            assert!(sexp.contains(kind), "{kind} not found in {sexp}");
        }
    }

    #[test]
    fn highlight_queries_compile() {
        for &grammar in Grammar::ALL {
            let query = grammar
                .ts_highlight_query()
                .unwrap_or_else(|err| panic!("Invalid highlights query for {grammar}: {err}"));
            assert!(query.capture_index_for_name("comment").is_some());
            assert!(query.capture_index_for_name("keyword").is_some());
        }
    }
}
