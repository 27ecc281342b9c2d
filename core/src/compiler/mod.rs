//! Bytecode compiler for Pila programs.
//!
//! Walks the statement tree once, assigning a static type to every
//! expression and emitting VM instructions as it goes.
//!
//! ## Design
//!
//! - Type checking and code generation happen in the same pass
//! - Semantic errors are collected, never thrown; a failed subexpression
//!   gets `Type::Error` and stops cascading diagnostics
//! - Control flow uses numbered labels from a single counter
//! - Int operands of mixed arithmetic get an `itof` right after their own
//!   code, inserted at a remembered offset for the left operand

mod bytecode;


pub use bytecode::BytecodeCompiler;
