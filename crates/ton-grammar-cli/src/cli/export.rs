use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use ton_grammar::header;
use tracing::info;
use tree_sitter_ton::Grammar;

use super::{GlobalOptions, selected_grammars};

/// Exports the grammar definitions, C headers and highlight queries
#[derive(Debug, clap::Parser)]
pub(super) struct ExportCommand {
    /// The path to the output directory
    #[clap(long, short)]
    output: PathBuf,

    /// Only export this grammar
    #[clap(long, short, value_parser = super::grammar_arg)]
    grammar: Option<Grammar>,
}

impl ExportCommand {
    pub(super) fn run(self, _global_options: GlobalOptions) -> anyhow::Result<()> {
        for grammar in selected_grammars(self.grammar) {
            let grammar_dir = self.output.join(grammar.name());
            export_grammar(grammar, &grammar_dir)
                .with_context(|| format!("Exporting the {grammar} grammar"))?;
            info!(%grammar, "Exported to {}", grammar_dir.display());
        }
        Ok(())
    }
}

fn export_grammar(grammar: Grammar, output_dir: &Path) -> anyhow::Result<()> {
    let definition = grammar.definition();
    let queries_dir = output_dir.join("queries");
    fs::create_dir_all(&queries_dir).context("Creating output directory")?;

    let grammar_json = definition.to_json().context("Serializing the grammar")?;
    fs::write(output_dir.join("grammar.json"), grammar_json).context("Writing grammar.json")?;
    fs::write(
        output_dir.join(header::file_name(&definition)),
        header::render(&definition),
    )
    .context("Writing the C header")?;
    fs::write(queries_dir.join("highlights.scm"), grammar.highlights_query())
        .context("Writing the highlights query")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_every_grammar() {
        let output = tempfile::tempdir().unwrap();
        let cmd = ExportCommand {
            output: output.path().to_path_buf(),
            grammar: None,
        };
        cmd.run(GlobalOptions {
            default_log_level: tracing::level_filters::LevelFilter::OFF,
        })
        .unwrap();

        let fift_header = fs::read_to_string(output.path().join("fift/tree-sitter-fift.h")).unwrap();
        assert_eq!(
            fift_header,
            include_str!("../../../tree-sitter-ton/bindings/c/tree-sitter-fift.h")
        );
        let func_header = fs::read_to_string(output.path().join("func/tree-sitter-func.h")).unwrap();
        assert_eq!(
            func_header,
            include_str!("../../../tree-sitter-ton/bindings/c/tree-sitter-func.h")
        );

        for grammar in Grammar::ALL {
            let dir = output.path().join(grammar.name());
            let json: serde_json::Value =
                serde_json::from_str(&fs::read_to_string(dir.join("grammar.json")).unwrap())
                    .unwrap();
            assert_eq!(json["name"], grammar.name());
            let query = fs::read_to_string(dir.join("queries/highlights.scm")).unwrap();
            assert_eq!(query, grammar.highlights_query());
        }
    }

    #[test]
    fn exports_a_single_grammar() {
        let output = tempfile::tempdir().unwrap();
        export_grammar(Grammar::Fift, &output.path().join("fift")).unwrap();
        assert!(output.path().join("fift/grammar.json").is_file());
        assert!(!output.path().join("func").exists());
    }
}
