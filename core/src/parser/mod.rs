pub mod error;
pub mod parser;

// Re-export the parser and rule enum for external use
pub use error::{ParseError, ParseErrorKind};
pub use parser::{MAX_NESTING_DEPTH, PilaParser, Rule, parse, parse_with_max_depth};

#[cfg(test)]
mod parse_test;

#[cfg(test)]
mod precedence_test;
