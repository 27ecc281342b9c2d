use core::fmt;

use serde::{Deserialize, Serialize};

/// Operand type tag carried by typed instructions (`push I 3`, `read F`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Int,
    Float,
    Boolean,
    String,
}

impl TypeTag {
    pub fn letter(self) -> char {
        match self {
            TypeTag::Int => 'I',
            TypeTag::Float => 'F',
            TypeTag::Boolean => 'B',
            TypeTag::String => 'S',
        }
    }

    pub fn from_letter(text: &str) -> Option<Self> {
        match text {
            "I" => Some(TypeTag::Int),
            "F" => Some(TypeTag::Float),
            "B" => Some(TypeTag::Boolean),
            "S" => Some(TypeTag::String),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Runtime value. The VM never sees a static `Error` type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl Value {
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::String(_) => TypeTag::String,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Boolean(_) => "bool",
            Value::String(_) => "string",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// What `print` writes: strings without quotes, booleans as `true`/`false`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
        }
    }
}
