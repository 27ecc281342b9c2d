use thiserror::Error;

use crate::ast::{Location, Span};
use crate::parser::Rule;

/// Parser error with the location it was detected at.
///
/// A parse error means there is no tree to check, so compilation does not
/// start.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{location} - {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: Location,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Input does not match the grammar
    #[error("expected {expected}, found {found}")]
    Syntax { expected: String, found: String },

    /// Numeric literal that does not fit its type
    #[error("invalid number literal '{text}'")]
    InvalidNumber { text: String },

    /// Brackets, prefix operators or nested constructs go deeper than the
    /// parser allows
    #[error("nesting depth {depth} exceeds maximum of {max_depth} levels")]
    MaxDepthExceeded { depth: usize, max_depth: usize },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, location: Location) -> Self {
        Self { kind, location }
    }

    /// Stable code shown by the renderer.
    pub fn code(&self) -> &'static str {
        match self.kind {
            ParseErrorKind::Syntax { .. } => "P001",
            ParseErrorKind::InvalidNumber { .. } => "P002",
            ParseErrorKind::MaxDepthExceeded { .. } => "P003",
        }
    }

    pub fn help(&self) -> Option<&'static str> {
        match self.kind {
            ParseErrorKind::Syntax { .. } => None,
            ParseErrorKind::InvalidNumber { .. } => {
                Some("integers must fit in 64 signed bits and floats must be finite")
            }
            ParseErrorKind::MaxDepthExceeded { .. } => {
                Some("Reduce nesting or move sub-expressions into variables")
            }
        }
    }
}

pub(crate) fn convert_pest_error(err: pest::error::Error<Rule>, source: &str) -> ParseError {
    use pest::error::{ErrorVariant, InputLocation, LineColLocation};

    let (start, end) = match err.location {
        InputLocation::Pos(pos) => (pos, pos),
        InputLocation::Span((start, end)) => (start, end),
    };
    let (line, column) = match err.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(pos, _) => pos,
    };

    let found = describe_found(source, start);
    let end = end.max(start + found_len(source, start));
    let location = Location::new(Span::new(start, end), line, column);

    let expected = match err.variant {
        ErrorVariant::ParsingError { positives, .. } => format_expected_rules(&positives),
        ErrorVariant::CustomError { message } => message,
    };

    ParseError::new(ParseErrorKind::Syntax { expected, found }, location)
}

/// Length in bytes of the token starting at `pos`, for underlining.
fn found_len(source: &str, pos: usize) -> usize {
    let rest = &source[pos.min(source.len())..];
    let word: usize = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(char::len_utf8)
        .sum();
    if word > 0 {
        word
    } else {
        rest.chars().next().map_or(0, char::len_utf8)
    }
}

fn describe_found(source: &str, pos: usize) -> String {
    let len = found_len(source, pos);
    if len == 0 {
        return "end of input".to_string();
    }
    format!("'{}'", &source[pos..pos + len])
}

fn format_expected_rules(rules: &[Rule]) -> String {
    if rules.is_empty() {
        return "something else".to_string();
    }

    // Group related rules into higher-level concepts
    let mut concepts: Vec<&str> = Vec::new();

    for rule in rules {
        let concept = match rule {
            Rule::integer | Rule::float | Rule::boolean | Rule::string => "literal",
            Rule::ident => "identifier",
            Rule::type_name => "type",
            Rule::expr | Rule::grouped | Rule::neg | Rule::not | Rule::binary => "expression",
            Rule::or
            | Rule::and
            | Rule::eq
            | Rule::ne
            | Rule::lt
            | Rule::gt
            | Rule::add
            | Rule::sub
            | Rule::concat
            | Rule::mul
            | Rule::div
            | Rule::modulo => "operator",
            Rule::assign_op => "'='",
            Rule::kw_else => "'else'",
            Rule::kw_while => "'while'",
            Rule::EOI => "end of input",
            _ => "statement",
        };
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    match concepts.split_last() {
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        None => "something else".to_string(),
    }
}
