//! Static types of the language.

use core::fmt;

use crate::vm::{TypeTag, Value};

/// Static type assigned to every expression by the compiler.
///
/// `Error` never exists at runtime. It marks an expression whose analysis
/// already failed, so consumers of it stay quiet instead of reporting the
/// same root cause again.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
    Boolean,
    String,
    Error,
}

impl Type {
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn is_error(self) -> bool {
        self == Type::Error
    }

    /// Value a freshly declared variable of this type starts with.
    pub fn zero_value(self) -> Option<Value> {
        match self {
            Type::Int => Some(Value::Int(0)),
            Type::Float => Some(Value::Float(0.0)),
            Type::Boolean => Some(Value::Boolean(false)),
            Type::String => Some(Value::String(String::new())),
            Type::Error => None,
        }
    }

    /// Operand tag used by typed instructions (`push`, `read`, arithmetic).
    pub fn tag(self) -> Option<TypeTag> {
        match self {
            Type::Int => Some(TypeTag::Int),
            Type::Float => Some(TypeTag::Float),
            Type::Boolean => Some(TypeTag::Boolean),
            Type::String => Some(TypeTag::String),
            Type::Error => None,
        }
    }
}

impl From<TypeTag> for Type {
    fn from(tag: TypeTag) -> Self {
        match tag {
            TypeTag::Int => Type::Int,
            TypeTag::Float => Type::Float,
            TypeTag::Boolean => Type::Boolean,
            TypeTag::String => Type::String,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Boolean => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Error => write!(f, "<error>"),
        }
    }
}
