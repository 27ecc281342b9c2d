#![allow(dead_code)]

use bumpalo::Bump;
use pila::{Code, Error, ExecutionOptions};

/// Compile and run `source`, feeding it `stdin`.
pub fn run_program(source: &str, stdin: &str) -> Result<String, Error> {
    let arena = Bump::new();
    let code = pila::compile(&arena, source)?;
    run_code(&code, stdin)
}

pub fn run_code(code: &Code, stdin: &str) -> Result<String, Error> {
    let mut output = Vec::new();
    pila::run(code, &ExecutionOptions::default(), stdin.as_bytes(), &mut output)?;
    Ok(String::from_utf8(output).expect("program output is UTF-8"))
}

/// Diagnostics of a program that must fail static checking, one
/// `line:column - message` entry each.
pub fn diagnostics(source: &str) -> Vec<String> {
    let arena = Bump::new();
    match pila::compile(&arena, source) {
        Err(Error::Compilation { diagnostics }) => {
            diagnostics.iter().map(|d| d.to_string()).collect()
        }
        Err(other) => panic!("expected diagnostics, got {other}"),
        Ok(code) => panic!("expected diagnostics, compiled to:\n{code}"),
    }
}

#[macro_export]
macro_rules! test_case {
    (
        name: $name:ident,
        input: $input:expr,
        $(stdin: $stdin:expr,)?
        output: $output:expr $(,)?
    ) => {
        #[test]
        fn $name() {
            #[allow(unused_variables)]
            let stdin = "";
            $(let stdin = $stdin;)?
            let output = cases::run_program($input, stdin)
                .unwrap_or_else(|e| panic!("program failed: {e}"));
            pretty_assertions::assert_eq!(output, $output);
        }
    };
    (
        name: $name:ident,
        input: $input:expr,
        errors: [$($error:expr),* $(,)?] $(,)?
    ) => {
        #[test]
        fn $name() {
            let expected: Vec<String> = vec![$($error.to_string()),*];
            pretty_assertions::assert_eq!(cases::diagnostics($input), expected);
        }
    };
    (
        name: $name:ident,
        input: $input:expr,
        $(stdin: $stdin:expr,)?
        runtime_error: $error:expr $(,)?
    ) => {
        #[test]
        fn $name() {
            #[allow(unused_variables)]
            let stdin = "";
            $(let stdin = $stdin;)?
            match cases::run_program($input, stdin) {
                Err(pila::Error::Runtime(err)) => {
                    pretty_assertions::assert_eq!(err.to_string(), $error)
                }
                other => panic!("expected runtime error, got {other:?}"),
            }
        }
    };
}
