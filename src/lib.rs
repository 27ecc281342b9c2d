//! Pila - a small typed statement language compiled to stack bytecode
//!
//! # Overview
//!
//! A Pila program is a list of statements over four value types: `int`,
//! `float`, `bool` and `string`. Programs are parsed, type checked and
//! lowered to a flat instruction list in one pass, and the instructions run
//! on a stack VM that talks to the outside world through `read` and `write`.
//!
//! # Quick Start
//!
//! ```
//! use bumpalo::Bump;
//! use pila::{ExecutionOptions, compile, run};
//!
//! let arena = Bump::new();
//! let code = compile(&arena, r#"
//!     int n; float total;
//!     read n;
//!     while (n > 0) { total = total + n / 2.0; n = n - 1; }
//!     write "total=", total;
//! "#).unwrap();
//!
//! let mut output = Vec::new();
//! run(&code, &ExecutionOptions::default(), "3\n".as_bytes(), &mut output).unwrap();
//! assert_eq!(output, b"total=3\n");
//! ```
//!
//! # Bytecode
//!
//! [`Code`] can be saved as the readable text listing
//! ([`Code::to_text`]) or as compact binary ([`Code::to_bytes`]) and loaded
//! back to run later without the source.

// Re-export public API from pila_core
pub use pila_core::api::{Error, ExecutionOptions, compile, compile_program, run};

pub use pila_core::diagnostics::{Diagnostic, Diagnostics, SemanticError};
pub use pila_core::parser::{
    MAX_NESTING_DEPTH, ParseError, ParseErrorKind, parse, parse_with_max_depth,
};
pub use pila_core::types::Type;
pub use pila_core::vm::{Code, DecodeError, ExecutionError, Instruction, TypeTag, VM, Value};

mod error_renderer;
pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
