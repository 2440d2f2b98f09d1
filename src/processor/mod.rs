//! The translation pipeline: scanner → {translator, folder} → emitter.
//!
//! Each call builds its own scanner, scopes and emitter over a borrowed
//! `Config`, so compilations never share state and may run in parallel.
pub mod error;
pub mod folder;
pub mod lexer;
pub mod scope;
pub mod translator;

pub use error::{CompileError, CompileResult, ErrorKind};

use crate::model::{Config, Mode};
use crate::writer::emitter::Emitter;
use folder::Folder;
use lexer::Lexer;
use scope::Scopes;
use translator::Translator;

/// Translate a whole program of module declarations.
pub fn compile_module(source: &str, config: &Config) -> CompileResult<String> {
    let mut translator = Translator::new(config);
    for token in Lexer::new(source, config) {
        translator.feed(&token)?;
    }
    translator.finish()
}

/// Fold one expression; identifiers resolve against the builtins only.
pub fn compile_expression(source: &str, config: &Config) -> CompileResult<String> {
    let scopes = Scopes::new(config);
    let mut folder = Folder::new(&scopes);
    for token in Lexer::new(source, config) {
        folder.feed(&token)?;
    }

    let mut out = Emitter::new(config);
    out.push(folder.finish()?);
    Ok(out.finish())
}

pub fn compile(source: &str, config: &Config, mode: Mode) -> CompileResult<String> {
    match mode {
        Mode::Module => compile_module(source, config),
        Mode::Expression => compile_expression(source, config),
    }
}
