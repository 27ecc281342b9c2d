use thiserror::Error;

use crate::types::Type;

/// Fault raised while executing bytecode.
///
/// Well-typed programs produced by the compiler can only hit
/// [`DivisionByZero`](ExecutionError::DivisionByZero), input errors, the
/// configured limits and I/O failures. The remaining variants guard against
/// hand-written or corrupted bytecode.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("operand stack underflow")]
    StackUnderflow,

    #[error("operand stack overflow: depth would exceed {max}")]
    StackOverflow { max: usize },

    #[error("jump to undefined label {0}")]
    UnresolvedLabel(u32),

    #[error("variable '{name}' loaded before any value was saved to it")]
    UndefinedVariable { name: String },

    #[error("'{instruction}' cannot operate on {operands}")]
    TypeFault {
        instruction: &'static str,
        operands: String,
    },

    #[error("integer division by zero")]
    DivisionByZero,

    #[error("expected {expected} input, got '{text}'")]
    InvalidInput { expected: Type, text: String },

    #[error("input ended before a value could be read")]
    EndOfInput,

    #[error("step limit of {limit} instructions exceeded")]
    StepLimitExceeded { limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error decoding a textual or binary bytecode listing.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("line {line}: {source}")]
    Text {
        line: usize,
        #[source]
        source: InstructionParseError,
    },

    #[error("invalid binary bytecode: {0}")]
    Binary(#[from] postcard::Error),
}

/// Error parsing one line of the textual instruction format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionParseError {
    #[error("empty instruction")]
    Empty,

    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),

    #[error("'{mnemonic}' expects {expected} operand(s), found {found}")]
    OperandCount {
        mnemonic: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid operand '{operand}' for '{mnemonic}'")]
    InvalidOperand { mnemonic: String, operand: String },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
}
