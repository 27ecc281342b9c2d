//! Pila VM instruction set.
//!
//! Every instruction is a variant of [`Instruction`]. Programs are flat
//! instruction lists; control flow uses symbolic labels rather than offsets,
//! so a `Label(n)` instruction marks a jump target and does nothing when
//! executed.
//!
//! # Textual form
//!
//! One instruction per line, mnemonic first, operands separated by spaces:
//!
//! ```text
//! push I 3
//! push S "hello\n"
//! save x
//! label 0
//! fjmp 1
//! print 2
//! ```
//!
//! String operands are double-quoted with `\"`, `\\`, `\n`, `\r` and `\t`
//! escapes. Float operands are written so they parse back to the same bits.
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::InstructionParseError;
use super::value::{TypeTag, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    // ========================================================================
    // Stack & Variables
    // ========================================================================
    /// Push a constant
    /// Stack: [...] -> [..., value]
    Push(Value),

    /// Discard top value
    /// Stack: [..., a] -> [...]
    Pop,

    /// Push the current value of a variable
    /// Stack: [...] -> [..., value]
    Load(String),

    /// Store top value into a variable, consuming it
    /// Stack: [..., value] -> [...]
    Save(String),

    // ========================================================================
    // Control Flow
    // ========================================================================
    /// Jump target. No effect when executed.
    Label(u32),

    /// Unconditional jump to the matching `Label`
    Jmp(u32),

    /// Pop a bool and jump to the matching `Label` if it is false
    /// Stack: [..., cond] -> [...]
    FalseJmp(u32),

    // ========================================================================
    // I/O
    // ========================================================================
    /// Pop `n` values and print them in push order, then a newline
    /// Stack: [..., v1, ..., vn] -> [...]
    Print(usize),

    /// Read one line of input as a value of the tagged type
    /// Stack: [...] -> [..., value]
    Read(TypeTag),

    // ========================================================================
    // Arithmetic
    // ========================================================================
    /// Stack: [..., a, b] -> [..., a + b]
    Add(TypeTag),
    /// Stack: [..., a, b] -> [..., a - b]
    Sub(TypeTag),
    /// Stack: [..., a, b] -> [..., a * b]
    Mul(TypeTag),
    /// Stack: [..., a, b] -> [..., a / b]
    Div(TypeTag),
    /// Integer remainder
    /// Stack: [..., a, b] -> [..., a % b]
    Mod,
    /// Stack: [..., a] -> [..., -a]
    Uminus,

    // ========================================================================
    // Strings, Logic & Comparison
    // ========================================================================
    /// Stack: [..., a, b] -> [..., a . b]
    Concat,
    /// Stack: [..., a, b] -> [..., a && b]
    And,
    /// Stack: [..., a, b] -> [..., a || b]
    Or,
    /// Stack: [..., a, b] -> [..., a > b]
    Gt,
    /// Stack: [..., a, b] -> [..., a < b]
    Lt,
    /// Stack: [..., a, b] -> [..., a == b]
    Eq,
    /// Stack: [..., a] -> [..., !a]
    Not,

    // ========================================================================
    // Conversion
    // ========================================================================
    /// Convert int to float
    /// Stack: [..., int] -> [..., float]
    ItoF,
}

impl Instruction {
    pub fn mnemonic(&self) -> &'static str {
        use Instruction::*;
        match self {
            Push(_) => "push",
            Pop => "pop",
            Load(_) => "load",
            Save(_) => "save",
            Label(_) => "label",
            Jmp(_) => "jmp",
            FalseJmp(_) => "fjmp",
            Print(_) => "print",
            Read(_) => "read",
            Add(_) => "add",
            Sub(_) => "sub",
            Mul(_) => "mul",
            Div(_) => "div",
            Mod => "mod",
            Uminus => "uminus",
            Concat => "concat",
            And => "and",
            Or => "or",
            Gt => "gt",
            Lt => "lt",
            Eq => "eq",
            Not => "not",
            ItoF => "itof",
        }
    }

    /// Label a jump instruction targets, if any.
    pub fn jump_target(&self) -> Option<u32> {
        match self {
            Instruction::Jmp(label) | Instruction::FalseJmp(label) => Some(*label),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        let mnemonic = self.mnemonic();
        match self {
            Push(value) => {
                write!(f, "{mnemonic} {} ", value.tag())?;
                match value {
                    Value::Int(i) => write!(f, "{i}"),
                    Value::Float(x) => write!(f, "{x:?}"),
                    Value::Boolean(b) => write!(f, "{b}"),
                    Value::String(s) => write_quoted(f, s),
                }
            }
            Load(name) | Save(name) => write!(f, "{mnemonic} {name}"),
            Label(n) | Jmp(n) | FalseJmp(n) => write!(f, "{mnemonic} {n}"),
            Print(n) => write!(f, "{mnemonic} {n}"),
            Read(tag) | Add(tag) | Sub(tag) | Mul(tag) | Div(tag) => {
                write!(f, "{mnemonic} {tag}")
            }
            Pop | Mod | Uminus | Concat | And | Or | Gt | Lt | Eq | Not | ItoF => {
                f.write_str(mnemonic)
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// One whitespace-separated word of an instruction line.
#[derive(Debug, PartialEq)]
struct Token {
    text: String,
    quoted: bool,
}

fn tokenize(line: &str) -> Result<Vec<Token>, InstructionParseError> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    None => return Err(InstructionParseError::UnterminatedString),
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some('"') => text.push('"'),
                        Some('\\') => text.push('\\'),
                        Some('n') => text.push('\n'),
                        Some('r') => text.push('\r'),
                        Some('t') => text.push('\t'),
                        Some(other) => return Err(InstructionParseError::InvalidEscape(other)),
                        None => return Err(InstructionParseError::UnterminatedString),
                    },
                    Some(c) => text.push(c),
                }
            }
            tokens.push(Token { text, quoted: true });
        } else {
            let mut text = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                text.push(c);
                chars.next();
            }
            tokens.push(Token {
                text,
                quoted: false,
            });
        }
    }

    Ok(tokens)
}

impl FromStr for Instruction {
    type Err = InstructionParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(line)?;
        let Some((head, operands)) = tokens.split_first() else {
            return Err(InstructionParseError::Empty);
        };
        if head.quoted {
            return Err(InstructionParseError::UnknownMnemonic(head.text.clone()));
        }
        let mnemonic = head.text.as_str();

        let expect = |count: usize| {
            if operands.len() == count {
                Ok(())
            } else {
                Err(InstructionParseError::OperandCount {
                    mnemonic: mnemonic.to_string(),
                    expected: count,
                    found: operands.len(),
                })
            }
        };
        let invalid = |token: &Token| InstructionParseError::InvalidOperand {
            mnemonic: mnemonic.to_string(),
            operand: token.text.clone(),
        };
        let word = |token: &Token| {
            if token.quoted || token.text.is_empty() {
                Err(invalid(token))
            } else {
                Ok(token.text.clone())
            }
        };
        let label = |token: &Token| {
            if token.quoted {
                return Err(invalid(token));
            }
            token.text.parse::<u32>().map_err(|_| invalid(token))
        };
        let tag = |token: &Token| {
            if token.quoted {
                return Err(invalid(token));
            }
            TypeTag::from_letter(&token.text).ok_or_else(|| invalid(token))
        };
        let numeric_tag = |token: &Token| match tag(token)? {
            t @ (TypeTag::Int | TypeTag::Float) => Ok(t),
            _ => Err(invalid(token)),
        };

        use Instruction::*;
        let instruction = match mnemonic {
            "push" => {
                expect(2)?;
                let (tag_token, value_token) = (&operands[0], &operands[1]);
                let value = match tag(tag_token)? {
                    TypeTag::String if value_token.quoted => {
                        Value::String(value_token.text.clone())
                    }
                    TypeTag::String => return Err(invalid(value_token)),
                    _ if value_token.quoted => return Err(invalid(value_token)),
                    TypeTag::Int => Value::Int(
                        value_token
                            .text
                            .parse()
                            .map_err(|_| invalid(value_token))?,
                    ),
                    TypeTag::Float => Value::Float(
                        value_token
                            .text
                            .parse()
                            .map_err(|_| invalid(value_token))?,
                    ),
                    TypeTag::Boolean => match value_token.text.as_str() {
                        "true" => Value::Boolean(true),
                        "false" => Value::Boolean(false),
                        _ => return Err(invalid(value_token)),
                    },
                };
                Push(value)
            }
            "load" => {
                expect(1)?;
                Load(word(&operands[0])?)
            }
            "save" => {
                expect(1)?;
                Save(word(&operands[0])?)
            }
            "label" => {
                expect(1)?;
                Label(label(&operands[0])?)
            }
            "jmp" => {
                expect(1)?;
                Jmp(label(&operands[0])?)
            }
            "fjmp" => {
                expect(1)?;
                FalseJmp(label(&operands[0])?)
            }
            "print" => {
                expect(1)?;
                let token = &operands[0];
                if token.quoted {
                    return Err(invalid(token));
                }
                Print(token.text.parse().map_err(|_| invalid(token))?)
            }
            "read" => {
                expect(1)?;
                Read(tag(&operands[0])?)
            }
            "add" => {
                expect(1)?;
                Add(numeric_tag(&operands[0])?)
            }
            "sub" => {
                expect(1)?;
                Sub(numeric_tag(&operands[0])?)
            }
            "mul" => {
                expect(1)?;
                Mul(numeric_tag(&operands[0])?)
            }
            "div" => {
                expect(1)?;
                Div(numeric_tag(&operands[0])?)
            }
            nullary => {
                let instruction = match nullary {
                    "pop" => Pop,
                    "mod" => Mod,
                    "uminus" => Uminus,
                    "concat" => Concat,
                    "and" => And,
                    "or" => Or,
                    "gt" => Gt,
                    "lt" => Lt,
                    "eq" => Eq,
                    "not" => Not,
                    "itof" => ItoF,
                    other => return Err(InstructionParseError::UnknownMnemonic(other.to_string())),
                };
                expect(0)?;
                instruction
            }
        };

        Ok(instruction)
    }
}
