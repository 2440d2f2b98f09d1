pub mod cli;
pub mod config;
pub mod model;
pub mod processor;
pub mod writer;

use anyhow::Context;
use clap::Parser;

pub use model::Config;
pub use processor::{CompileError, compile_expression, compile_module};

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    let verbose = args.verbose;

    // 1. ── Configure ──────────────────────────────────────────────────
    let config = match &args.config {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };
    if verbose {
        eprintln!(
            "Config ready: {} builtins, symbols up to {} chars",
            config.globals.len(),
            config.max_symbol_len
        );
    }

    // 2. ── Read ───────────────────────────────────────────────────────
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Reading {}", args.input.display()))?;
    if verbose {
        eprintln!("Source loaded, size: {} bytes", source.len());
    }

    // 3. ── Translate ──────────────────────────────────────────────────
    let output = processor::compile(&source, &config, args.mode)?;
    if verbose {
        eprintln!("Translated {:?} input, {} bytes of output", args.mode, output.len());
    }

    // 4. ── Write ──────────────────────────────────────────────────────
    writer::js::emit(&output, args.output.as_deref()).with_context(|| match &args.output {
        Some(path) => format!("Writing {}", path.display()),
        None => "Writing to stdout".to_string(),
    })?;
    if verbose {
        eprintln!("Complete!");
    }

    Ok(())
}
