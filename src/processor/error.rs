//! Diagnostics shared by every stage of the pipeline.
//!
//! Stages report an `ErrorKind`; the stage that knows the current line
//! tags it, producing the single `CompileError` a compilation can fail with.

use snafu::Snafu;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ErrorKind {
    #[snafu(display("Symbol «{name}» is longer than {max} characters"))]
    TooLongIdentifier { name: String, max: usize },

    #[snafu(display("Symbol «{name}» is already defined"))]
    AlreadyDefined { name: String },

    #[snafu(display("Unknown symbol «{name}»"))]
    UndefinedSymbol { name: String },

    #[snafu(display("Numeric constant {text} is outside {min}..{max}"))]
    NumericOutOfRange { text: String, min: u32, max: u32 },

    #[snafu(display("Unbalanced parenthesis: {detail}"))]
    UnbalancedParenthesis { detail: String },

    #[snafu(display("Module «{name}» is already open"))]
    AlreadyOpen { name: String },

    #[snafu(display("Expected {expected}, found {found}"))]
    StructuralSyntaxError { expected: String, found: String },
}

impl ErrorKind {
    pub fn at(self, line: usize) -> CompileError {
        CompileError { kind: self, line }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// The one diagnostic of a failed compilation: `"<message> at line <N>."`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    kind: ErrorKind,
    line: usize,
}

impl CompileError {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}.", self.kind, self.line)
    }
}

impl std::error::Error for CompileError {}
