use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};
use ton_grammar::Grammar;

fn main() -> anyhow::Result<()> {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").context("OUT_DIR is not set")?);
    let version = crate_version().context("Reading the crate version")?;

    let mut grammars = Vec::new();
    if env::var_os("CARGO_FEATURE_FIFT").is_some() {
        grammars.push(ton_grammar::fift::grammar());
    }
    if env::var_os("CARGO_FEATURE_FUNC").is_some() {
        grammars.push(ton_grammar::func::grammar());
    }

    for grammar in &grammars {
        let src_dir = out_dir.join(grammar.name());
        generate_parser(grammar, &src_dir, version)
            .with_context(|| format!("Generating the {} parser", grammar.name()))?;
        compile_parser(grammar, &src_dir);
    }

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../ton-grammar/src");
    Ok(())
}

fn crate_version() -> anyhow::Result<(u8, u8, u8)> {
    let component = |key: &str| -> anyhow::Result<u8> {
        env::var(key)
            .with_context(|| format!("{key} is not set"))?
            .parse()
            .with_context(|| format!("Parsing {key}"))
    };
    Ok((
        component("CARGO_PKG_VERSION_MAJOR")?,
        component("CARGO_PKG_VERSION_MINOR")?,
        component("CARGO_PKG_VERSION_PATCH")?,
    ))
}

fn generate_parser(grammar: &Grammar, src_dir: &Path, version: (u8, u8, u8)) -> anyhow::Result<()> {
    let grammar_json = grammar.to_json().context("Serializing the grammar")?;
    let (name, parser_c) =
        tree_sitter_generate::generate_parser_for_grammar(&grammar_json, Some(version))
            .map_err(|err| anyhow!("tree-sitter could not generate the parser: {err}"))?;
    anyhow::ensure!(
        name == grammar.name(),
        "The generated parser is named {name}, expected {}",
        grammar.name()
    );

    let header_dir = src_dir.join("tree_sitter");
    fs::create_dir_all(&header_dir).context("Creating the source directory")?;
    fs::write(src_dir.join("grammar.json"), grammar_json).context("Writing grammar.json")?;
    fs::write(src_dir.join("parser.c"), parser_c).context("Writing parser.c")?;
    fs::write(header_dir.join("parser.h"), tree_sitter::PARSER_HEADER)
        .context("Writing tree_sitter/parser.h")?;
    Ok(())
}

fn compile_parser(grammar: &Grammar, src_dir: &Path) {
    let mut c_config = cc::Build::new();
    c_config
        .std("c11")
        .include(src_dir)
        .file(src_dir.join("parser.c"))
        .flag_if_supported("-Wno-unused-parameter")
        .flag_if_supported("-Wno-unused-but-set-variable")
        .flag_if_supported("-Wno-trigraphs");
    if env::var("CARGO_CFG_TARGET_ENV").is_ok_and(|target_env| target_env == "msvc") {
        c_config.flag("-utf-8");
    }
    c_config.compile(&format!("tree-sitter-{}", grammar.name()));
}
