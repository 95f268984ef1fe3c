use std::io::{self, Write};

use anyhow::Context;
use tracing::error;
use tree_sitter_ton::{Grammar, descriptor};

use super::GlobalOptions;

/// Validates the compiled language descriptors
#[derive(Debug, clap::Parser)]
pub(super) struct CheckCommand {
    /// Print the descriptor reports as JSON
    #[clap(long)]
    json: bool,
}

impl CheckCommand {
    pub(super) fn run(self, _global_options: GlobalOptions) -> anyhow::Result<()> {
        let mut reports = Vec::with_capacity(Grammar::ALL.len());
        let mut failures = 0;
        for &grammar in Grammar::ALL {
            match descriptor::validate(grammar) {
                Ok(report) => reports.push(report),
                Err(err) => {
                    error!(%grammar, "{err}");
                    failures += 1;
                }
            }
        }

        let mut stdout = io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut stdout, &reports).context("Writing JSON")?;
            writeln!(stdout).context("Writing to stdout")?;
        } else {
            for report in &reports {
                writeln!(
                    stdout,
                    "{:<6} ok  abi {}, {} node kinds, {} fields, {} parse states",
                    report.grammar.name(),
                    report.abi_version,
                    report.node_kind_count,
                    report.field_count,
                    report.parse_state_count
                )
                .context("Writing to stdout")?;
            }
        }
        anyhow::ensure!(failures == 0, "{failures} descriptor(s) failed validation");
        Ok(())
    }
}
