use std::io::{self, Write};

use anyhow::Context;
use itertools::Itertools;
use serde::Serialize;
use tree_sitter_ton::Grammar;

use super::GlobalOptions;

/// Lists the grammars compiled into this binary
#[derive(Debug, clap::Parser)]
pub(super) struct ListCommand {
    /// Print the list as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct GrammarInfo {
    grammar: Grammar,
    accessor_symbol: String,
    file_extensions: &'static [&'static str],
    lsp_language_id: &'static str,
    abi_version: usize,
}

impl GrammarInfo {
    fn new(grammar: Grammar) -> Self {
        Self {
            grammar,
            accessor_symbol: grammar.accessor_symbol(),
            file_extensions: grammar.file_extensions(),
            lsp_language_id: grammar.lsp_language_id(),
            abi_version: grammar.language().abi_version(),
        }
    }
}

impl ListCommand {
    pub(super) fn run(self, _global_options: GlobalOptions) -> anyhow::Result<()> {
        let infos = Grammar::ALL.iter().copied().map(GrammarInfo::new).collect_vec();
        let mut stdout = io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut stdout, &infos).context("Writing JSON")?;
            writeln!(stdout).context("Writing to stdout")?;
            return Ok(());
        }
        for info in &infos {
            let extensions = info
                .file_extensions
                .iter()
                .map(|ext| format!(".{ext}"))
                .join(", ");
            writeln!(
                stdout,
                "{:<6} {:<18} abi {:<3} {extensions}",
                info.grammar.name(),
                info.accessor_symbol,
                info.abi_version
            )
            .context("Writing to stdout")?;
        }
        Ok(())
    }
}
