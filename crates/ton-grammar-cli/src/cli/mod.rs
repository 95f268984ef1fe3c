mod check;
mod export;
mod list;
mod parse;

use std::str::FromStr;

use anyhow::Context;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use tree_sitter_ton::Grammar;

#[derive(Debug, clap::Parser)]
#[command(version, about, styles = clap::builder::Styles::styled())]
pub struct Cli {
    #[clap(flatten)]
    global_options: GlobalOptions,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub(super) fn run(self) -> anyhow::Result<()> {
        setup_logger(&self.global_options).context("Setting up logger")?;
        match self.command {
            Command::List(cmd) => cmd.run(self.global_options),
            Command::Check(cmd) => cmd.run(self.global_options),
            Command::Parse(cmd) => cmd.run(self.global_options),
            Command::Export(cmd) => cmd.run(self.global_options),
        }
    }
}

#[derive(Debug, clap::Parser)]
struct GlobalOptions {
    #[clap(long, default_value = "info", env = "TON_GRAMMAR_LOG_LEVEL")]
    default_log_level: LevelFilter,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    List(list::ListCommand),
    Check(check::CheckCommand),
    Parse(parse::ParseCommand),
    Export(export::ExportCommand),
}

fn setup_logger(global_opts: &GlobalOptions) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_timer(fmt::time::ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_owned())),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(global_opts.default_log_level.into())
                .from_env()
                .context("Constructing log filter from env.")?,
        )
        .init();

    Ok(())
}

/// Parses a `--grammar` value.
fn grammar_arg(value: &str) -> Result<Grammar, String> {
    Grammar::from_str(value).map_err(|err| err.to_string())
}

/// The grammars selected by an optional `--grammar` filter.
fn selected_grammars(filter: Option<Grammar>) -> Vec<Grammar> {
    filter.map_or_else(|| Grammar::ALL.to_vec(), |grammar| vec![grammar])
}
