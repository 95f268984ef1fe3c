use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use itertools::Itertools;
use rayon::prelude::*;
use tracing::{info, warn};
use tree_sitter_ton::{
    Grammar,
    syntax::{SyntaxIssue, syntax_issues},
};

use super::GlobalOptions;

/// Parses source files and reports syntax errors
#[derive(Debug, clap::Parser)]
pub(super) struct ParseCommand {
    /// Files or directories to parse
    #[clap(required = true)]
    paths: Vec<PathBuf>,

    /// Parse with this grammar instead of detecting it from the file extension
    #[clap(long, short, value_parser = super::grammar_arg)]
    grammar: Option<Grammar>,

    /// Print the syntax tree of each file as an S-expression
    #[clap(long)]
    sexp: bool,
}

#[derive(Debug)]
struct ParsedFile {
    path: PathBuf,
    grammar: Grammar,
    issues: Vec<SyntaxIssue>,
    sexp: Option<String>,
}

impl ParseCommand {
    pub(super) fn run(self, _global_options: GlobalOptions) -> anyhow::Result<()> {
        let source_files = self.find_source_files()?;
        if source_files.is_empty() {
            warn!("No source files found");
            return Ok(());
        }
        info!(files = source_files.len(), "Parsing source files");

        let parsed_files: Vec<_> = source_files
            .into_par_iter()
            .map(|(path, grammar)| parse_file(path, grammar, self.sexp))
            .collect::<Result<_, _>>()?;

        let mut stdout = io::stdout().lock();
        for parsed in &parsed_files {
            if !parsed.issues.is_empty() {
                warn!(
                    path = %parsed.path.display(),
                    grammar = %parsed.grammar,
                    issues = parsed.issues.len(),
                    "Syntax issues found"
                );
            }
            for issue in &parsed.issues {
                writeln!(stdout, "{}:{issue}", parsed.path.display())
                    .context("Writing to stdout")?;
            }
            if let Some(sexp) = &parsed.sexp {
                writeln!(stdout, "{}: {sexp}", parsed.path.display())
                    .context("Writing to stdout")?;
            }
        }

        let failed = parsed_files
            .iter()
            .filter(|parsed| !parsed.issues.is_empty())
            .count();
        info!(files = parsed_files.len(), failed, "Parsing finished");
        anyhow::ensure!(
            failed == 0,
            "{failed} of {} files have syntax issues",
            parsed_files.len()
        );
        Ok(())
    }

    /// Collects the files to parse together with their grammar.
    ///
    /// Explicitly named files are always parsed. Directories are searched
    /// recursively for files with a known extension.
    fn find_source_files(&self) -> anyhow::Result<Vec<(PathBuf, Grammar)>> {
        let mut source_files = Vec::new();
        for path in &self.paths {
            if path.is_file() {
                let grammar = self
                    .grammar
                    .or_else(|| Grammar::from_path(path))
                    .with_context(|| format!("Cannot detect the grammar of {}", path.display()))?;
                source_files.push((path.clone(), grammar));
                continue;
            }
            let found: Vec<_> = walkdir::WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_ok(|it| it.file_type().is_file())
                .filter_map_ok(|it| {
                    let grammar = self.detect_grammar(it.path())?;
                    Some((it.into_path(), grammar))
                })
                .try_collect()
                .with_context(|| format!("Searching for source files in {}", path.display()))?;
            source_files.extend(found);
        }
        Ok(source_files)
    }

    fn detect_grammar(&self, path: &Path) -> Option<Grammar> {
        Grammar::from_path(path).filter(|detected| self.grammar.is_none_or(|it| it == *detected))
    }
}

fn parse_file(path: PathBuf, grammar: Grammar, sexp: bool) -> anyhow::Result<ParsedFile> {
    let source = fs::read(&path).with_context(|| format!("Reading {}", path.display()))?;
    let tree = grammar
        .parse(&source)
        .with_context(|| format!("Parsing {}", path.display()))?;
    let issues = syntax_issues(&tree);
    let sexp = sexp.then(|| tree.root_node().to_sexp());
    Ok(ParsedFile {
        path,
        grammar,
        issues,
        sexp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(paths: &[&Path], grammar: Option<Grammar>) -> ParseCommand {
        ParseCommand {
            paths: paths.iter().map(|it| it.to_path_buf()).collect(),
            grammar,
            sexp: false,
        }
    }

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("contracts/imports")).unwrap();
        fs::write(dir.path().join("contracts/main.fc"), "global int x;").unwrap();
        fs::write(dir.path().join("contracts/imports/stdlib.func"), "const y = 1;").unwrap();
        fs::write(dir.path().join("contracts/main.fif"), "PROGRAM{\nEND>c\n").unwrap();
        fs::write(dir.path().join("contracts/README.md"), "# counter").unwrap();
        dir
    }

    #[test]
    fn finds_sources_by_extension() {
        let dir = workspace();
        let found = command(&[dir.path()], None).find_source_files().unwrap();
        let found: Vec<_> = found
            .into_iter()
            .map(|(path, grammar)| (path.strip_prefix(dir.path()).unwrap().to_path_buf(), grammar))
            .collect();
        assert_eq!(
            found,
            [
                (PathBuf::from("contracts/imports/stdlib.func"), Grammar::FunC),
                (PathBuf::from("contracts/main.fc"), Grammar::FunC),
                (PathBuf::from("contracts/main.fif"), Grammar::Fift),
            ]
        );
    }

    #[test]
    fn grammar_filter_restricts_directories() {
        let dir = workspace();
        let found = command(&[dir.path()], Some(Grammar::Fift))
            .find_source_files()
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, Grammar::Fift);
    }

    #[test]
    fn explicit_files_need_a_grammar() {
        let dir = workspace();
        let readme = dir.path().join("contracts/README.md");
        assert!(command(&[readme.as_path()], None).find_source_files().is_err());
        let found = command(&[readme.as_path()], Some(Grammar::FunC))
            .find_source_files()
            .unwrap();
        assert_eq!(found, [(readme, Grammar::FunC)]);
    }

    #[test]
    fn parse_reports_issues() {
        let dir = workspace();
        let clean = parse_file(dir.path().join("contracts/main.fc"), Grammar::FunC, true).unwrap();
        assert!(clean.issues.is_empty());
        assert!(clean.sexp.is_some_and(|it| it.starts_with("(source_file")));

        let broken = dir.path().join("broken.fc");
        fs::write(&broken, "int main( {").unwrap();
        let parsed = parse_file(broken.clone(), Grammar::FunC, false).unwrap();
        assert_eq!(parsed.grammar, Grammar::FunC);
        assert!(!parsed.issues.is_empty());
        assert!(parsed.sexp.is_none());
        assert!(command(&[broken.as_path()], None).run(test_options()).is_err());
    }

    fn test_options() -> GlobalOptions {
        GlobalOptions {
            default_log_level: tracing::level_filters::LevelFilter::OFF,
        }
    }
}
