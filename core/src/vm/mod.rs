//! Bytecode representation and the stack machine that runs it.

mod code;
mod error;
mod instruction_set;
mod operators;
mod runtime;
mod stack;
mod value;


pub use code::Code;
pub use error::{DecodeError, ExecutionError, InstructionParseError};
pub use instruction_set::Instruction;
pub use runtime::VM;
pub use value::{TypeTag, Value};

pub use stack::Stack;
