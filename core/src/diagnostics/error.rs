use thiserror::Error;

use crate::types::Type;

/// Static (semantic) errors found while compiling.
///
/// None of these abort compilation. They are collected in
/// [`Diagnostics`](super::Diagnostics) and only gate whether the VM may run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("Variable '{name}' was not declared.")]
    UndeclaredVariable { name: String },

    #[error("Variable '{name}' was already declared.")]
    RedeclaredVariable { name: String },

    /// An operand type the operator never accepts (e.g. `true + 1`, `-"s"`).
    #[error("Operator '{op}' does not support type {ty}.")]
    UnsupportedOperand { op: &'static str, ty: Type },

    /// Each operand is acceptable on its own but not in this pairing.
    #[error("Operator '{op}' cannot be applied to {left} and {right}.")]
    IncompatibleOperands {
        op: &'static str,
        left: Type,
        right: Type,
    },

    #[error("Variable '{name}' type is {target}, but the assigned value is {value}.")]
    AssignmentMismatch {
        name: String,
        target: Type,
        value: Type,
    },

    #[error("Condition expression expected bool, got {found}.")]
    NonBooleanCondition { found: Type },

    #[error("Ternary branches must have matching types, got {then_ty} and {else_ty}.")]
    TernaryBranchMismatch { then_ty: Type, else_ty: Type },
}

impl SemanticError {
    /// Stable code for documentation lookup and rendering.
    pub fn code(&self) -> &'static str {
        match self {
            SemanticError::UndeclaredVariable { .. } => "E001",
            SemanticError::RedeclaredVariable { .. } => "E002",
            SemanticError::UnsupportedOperand { .. } => "E003",
            SemanticError::IncompatibleOperands { .. } => "E004",
            SemanticError::AssignmentMismatch { .. } => "E005",
            SemanticError::NonBooleanCondition { .. } => "E006",
            SemanticError::TernaryBranchMismatch { .. } => "E007",
        }
    }

    pub fn help(&self) -> Option<&'static str> {
        match self {
            SemanticError::UndeclaredVariable { .. } => {
                Some("Declare the variable before using it, e.g. `int x;`")
            }
            SemanticError::AssignmentMismatch { .. } => {
                Some("Only int values are converted implicitly, and only into float variables")
            }
            SemanticError::IncompatibleOperands { .. } => {
                Some("Both operands must be numbers, both bool, or both string")
            }
            _ => None,
        }
    }
}
