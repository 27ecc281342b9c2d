//! Pila core: parser, static checker, bytecode compiler and stack VM for a
//! small typed statement language.
//!
//! The pipeline runs one way:
//!
//! ```text
//! source --parser--> ast::Program --compiler--> vm::Code --vm::VM--> output
//!                                      |
//!                        symbols::SymbolTable, diagnostics::Diagnostics
//! ```
//!
//! Compilation never stops at the first semantic error. Every problem is
//! recorded in a [`diagnostics::Diagnostics`] collector, and the bytecode is
//! only handed to the VM when that collector is empty.

pub mod api;
pub mod ast;
pub mod compiler;
pub mod diagnostics;
pub mod parser;
pub mod symbols;
pub mod types;
pub mod vm;
