//! Public API for the Pila language.
//!
//! The functions here drive the whole pipeline: parse, check and lower to
//! bytecode, then execute on the stack VM. Each stage is also usable on its
//! own through the [`parser`](crate::parser), [`compiler`](crate::compiler)
//! and [`vm`](crate::vm) modules.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use pila_core::api::{self, ExecutionOptions};
//!
//! let arena = Bump::new();
//! let code = api::compile(&arena, "int x; x = 2 * 21; write x;").unwrap();
//!
//! let mut output = Vec::new();
//! api::run(&code, &ExecutionOptions::default(), "".as_bytes(), &mut output).unwrap();
//! assert_eq!(output, b"42\n");
//! ```

pub mod error;
pub mod options;

use std::io::{BufRead, Write};

use bumpalo::Bump;
use tracing::debug;

use crate::ast::Program;
use crate::compiler::BytecodeCompiler;
use crate::diagnostics::Diagnostics;
use crate::parser;
use crate::vm::{Code, VM};

pub use error::Error;
pub use options::ExecutionOptions;

/// Parse and compile `source`.
///
/// Bytecode is only returned for a program with no diagnostics. Otherwise
/// every diagnostic is returned in [`Error::Compilation`].
pub fn compile<'a>(arena: &'a Bump, source: &'a str) -> Result<Code, Error> {
    let program = parser::parse(arena, source)?;
    let mut diagnostics = Diagnostics::new();
    let code = compile_program(&program, &mut diagnostics);
    if !diagnostics.is_empty() {
        debug!(errors = diagnostics.len(), "Compilation rejected");
        return Err(Error::Compilation {
            diagnostics: diagnostics.into_vec(),
        });
    }
    Ok(code)
}

/// Lower an already parsed program, reporting into `diagnostics`.
///
/// The returned code is incomplete whenever a diagnostic was reported and
/// must not be executed in that case.
pub fn compile_program(program: &Program<'_>, diagnostics: &mut Diagnostics) -> Code {
    BytecodeCompiler::compile(program, diagnostics)
}

/// Execute `code` to completion.
pub fn run<R, W>(
    code: &Code,
    options: &ExecutionOptions,
    input: R,
    output: W,
) -> Result<(), Error>
where
    R: BufRead,
    W: Write,
{
    let mut vm = VM::new(code, options.clone(), input, output);
    vm.run()?;
    debug!(steps = vm.steps(), "Program finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run_source(source: &str, input: &str) -> Result<String, Error> {
        let arena = Bump::new();
        let code = compile(&arena, source)?;
        let mut output = Vec::new();
        run(&code, &ExecutionOptions::default(), input.as_bytes(), &mut output)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_compile_and_run() {
        let output = run_source("int a; read a; write a * 2;", "21\n").unwrap();
        assert_eq!(output, "42\n");
    }

    #[test]
    fn test_parse_error_stops_pipeline() {
        let err = run_source("write 1", "").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.diagnostics().is_empty());
    }

    #[test]
    fn test_diagnostics_gate_execution() {
        let err = run_source("write y; int x; x = \"s\";", "").unwrap_err();
        let Error::Compilation { diagnostics } = &err else {
            panic!("expected compilation error, got {err:?}");
        };
        let codes: Vec<_> = diagnostics.iter().map(|d| d.code()).collect();
        assert_eq!(codes, vec!["E001", "E005"]);
        assert_eq!(err.to_string(), "Compilation failed with 2 error(s)");
    }

    #[test]
    fn test_runtime_error() {
        let err = run_source("int z; write 1 / z;", "").unwrap_err();
        assert!(matches!(
            err,
            Error::Runtime(crate::vm::ExecutionError::DivisionByZero)
        ));
    }

    #[test]
    fn test_compile_program_keeps_partial_code() {
        let arena = Bump::new();
        let program = parser::parse(&arena, "int x; write y;").unwrap();
        let mut diagnostics = Diagnostics::new();
        let code = compile_program(&program, &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert!(!code.is_empty());
    }
}
