//! Public error type for the Pila API.
//!
//! Each pipeline stage has its own error type. They are wrapped here so that
//! callers driving the whole pipeline only handle one.

use thiserror::Error;

use crate::diagnostics::Diagnostic;
use crate::parser::ParseError;
use crate::vm::{DecodeError, ExecutionError};

/// Public error type for all Pila operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The source did not match the grammar. No checking was attempted.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The program parsed but failed static checking.
    ///
    /// Holds every diagnostic, in source order.
    #[error("Compilation failed with {} error(s)", diagnostics.len())]
    Compilation { diagnostics: Vec<Diagnostic> },

    /// The VM stopped on a fault.
    #[error("Runtime error: {0}")]
    Runtime(#[from] ExecutionError),

    /// Persisted bytecode could not be read back.
    #[error("Invalid bytecode: {0}")]
    Decode(#[from] DecodeError),
}

impl Error {
    /// Semantic diagnostics carried by a compilation failure.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Compilation { diagnostics } => diagnostics,
            _ => &[],
        }
    }
}
