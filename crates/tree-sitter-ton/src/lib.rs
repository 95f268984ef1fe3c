//! Tree-sitter grammars for the TON languages Fift and FunC.
//!
//! Each grammar is generated and compiled by the build script, which links
//! one C accessor per grammar into this crate (`tree_sitter_fift`,
//! `tree_sitter_func`). The accessors return process-wide, immutable
//! `TSLanguage` descriptors and can be called from any foreign host.
//!
//! ```
//! let mut parser = tree_sitter::Parser::new();
//! parser
//!     .set_language(&tree_sitter_ton::LANGUAGE_FIFT.into())
//!     .expect("Error loading Fift grammar");
//! ```

#[cfg(any(feature = "fift", feature = "func"))]
use tree_sitter_language::LanguageFn;

pub mod descriptor;
mod grammar;
pub mod syntax;

pub use descriptor::{DescriptorError, DescriptorReport};
pub use grammar::{Grammar, ParseError, UnknownGrammar};

unsafe extern "C" {
    #[cfg(feature = "fift")]
    fn tree_sitter_fift() -> *const ();
    #[cfg(feature = "func")]
    fn tree_sitter_func() -> *const ();
}

/// The tree-sitter [`LanguageFn`] for Fift.
#[cfg(feature = "fift")]
pub const LANGUAGE_FIFT: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_fift) };

/// The tree-sitter [`LanguageFn`] for FunC.
#[cfg(feature = "func")]
pub const LANGUAGE_FUNC: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_func) };

#[cfg(feature = "fift")]
pub const FIFT_HIGHLIGHTS_QUERY: &str = include_str!("../queries/fift/highlights.scm");

#[cfg(feature = "func")]
pub const FUNC_HIGHLIGHTS_QUERY: &str = include_str!("../queries/func/highlights.scm");

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(any(feature = "fift", feature = "func"))]
    fn call(language: LanguageFn) -> usize {
        // SAFETY: the accessors take no arguments and return static data.
        unsafe { language.into_raw()() as usize }
    }

    #[cfg(feature = "fift")]
    #[test]
    fn test_can_load_fift_grammar() {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&LANGUAGE_FIFT.into())
            .expect("Error loading Fift grammar");
    }

    #[cfg(feature = "func")]
    #[test]
    fn test_can_load_func_grammar() {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&LANGUAGE_FUNC.into())
            .expect("Error loading FunC grammar");
    }

    #[cfg(feature = "fift")]
    #[test]
    fn fift_accessor_is_stable() {
        let fift = call(LANGUAGE_FIFT);
        assert_ne!(fift, 0);
        assert_eq!(fift, call(LANGUAGE_FIFT));
    }

    #[cfg(feature = "func")]
    #[test]
    fn func_accessor_is_stable() {
        let func = call(LANGUAGE_FUNC);
        assert_ne!(func, 0);
        assert_eq!(func, call(LANGUAGE_FUNC));
    }

    #[cfg(all(feature = "fift", feature = "func"))]
    #[test]
    fn accessors_are_distinct() {
        assert_ne!(call(LANGUAGE_FIFT), call(LANGUAGE_FUNC));
    }

    #[test]
    fn committed_headers_are_current() {
        let committed = [
            #[cfg(feature = "fift")]
            (include_str!("../bindings/c/tree-sitter-fift.h"), Grammar::Fift),
            #[cfg(feature = "func")]
            (include_str!("../bindings/c/tree-sitter-func.h"), Grammar::FunC),
        ];
        for (header, grammar) in committed {
            let definition = grammar.definition();
            assert_eq!(header, ton_grammar::header::render(&definition));
            assert!(header.contains(&format!("*{}(void);", grammar.accessor_symbol())));
        }
    }

    #[cfg(any(feature = "fift", feature = "func"))]
    #[test]
    fn concurrent_first_calls_agree() {
        const THREADS: usize = 8;
        let barrier = std::sync::Barrier::new(THREADS);
        let handles: Vec<_> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..THREADS)
                .map(|idx| {
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        let grammar = Grammar::ALL[idx % Grammar::ALL.len()];
                        let typed = grammar.language() as *const tree_sitter::Language as usize;
                        (grammar, grammar.raw_descriptor() as usize, typed)
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap())
                .collect()
        });
        for grammar in Grammar::ALL {
            let seen: Vec<_> = handles
                .iter()
                .filter(|(g, ..)| g == grammar)
                .map(|(_, raw, typed)| (*raw, *typed))
                .collect();
            assert!(!seen.is_empty());
            assert!(seen.iter().all(|handle| *handle == seen[0]), "{grammar}");
            assert_ne!(seen[0].0, 0);
        }
    }
}
