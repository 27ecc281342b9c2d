//! Binary operator implementations for the VM.

use super::{ExecutionError, Instruction, TypeTag, Value};

/// Numeric operand pair after runtime promotion.
enum Numeric {
    Ints(i64, i64),
    Floats(f64, f64),
}

/// Int with Float promotes the Int side.
fn numeric_pair(left: &Value, right: &Value) -> Option<Numeric> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(Numeric::Ints(*a, *b)),
        (Value::Float(a), Value::Float(b)) => Some(Numeric::Floats(*a, *b)),
        (Value::Int(a), Value::Float(b)) => Some(Numeric::Floats(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Some(Numeric::Floats(*a, *b as f64)),
        _ => None,
    }
}

fn fault(instruction: &Instruction, left: &Value, right: &Value) -> ExecutionError {
    ExecutionError::TypeFault {
        instruction: instruction.mnemonic(),
        operands: format!("{} and {}", left.type_name(), right.type_name()),
    }
}

/// Evaluate a binary instruction on the two popped operands.
///
/// Integer arithmetic wraps on overflow. Integer division or remainder by
/// zero is an error; float division follows IEEE 754.
pub(super) fn eval_binary(
    instruction: &Instruction,
    left: Value,
    right: Value,
) -> Result<Value, ExecutionError> {
    use Instruction::*;

    let result = match instruction {
        Add(tag) | Sub(tag) | Mul(tag) | Div(tag) => match (tag, numeric_pair(&left, &right)) {
            // A float-tagged operation on two ints comes from an int ternary
            // branch flowing into float arithmetic
            (TypeTag::Float, Some(Numeric::Ints(a, b))) => {
                Value::Float(eval_binary_float(instruction, a as f64, b as f64))
            }
            (_, Some(Numeric::Ints(a, b))) => Value::Int(eval_binary_int(instruction, a, b)?),
            (_, Some(Numeric::Floats(a, b))) => {
                Value::Float(eval_binary_float(instruction, a, b))
            }
            (_, None) => return Err(fault(instruction, &left, &right)),
        },
        Mod => match (&left, &right) {
            (Value::Int(_), Value::Int(0)) => return Err(ExecutionError::DivisionByZero),
            (Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_rem(*b)),
            _ => return Err(fault(instruction, &left, &right)),
        },
        Lt | Gt => {
            let less = matches!(instruction, Lt);
            let ordered = match numeric_pair(&left, &right) {
                Some(Numeric::Ints(a, b)) => {
                    if less {
                        a < b
                    } else {
                        a > b
                    }
                }
                Some(Numeric::Floats(a, b)) => {
                    if less {
                        a < b
                    } else {
                        a > b
                    }
                }
                None => return Err(fault(instruction, &left, &right)),
            };
            Value::Boolean(ordered)
        }
        Eq => {
            let equal = match (&left, &right) {
                (Value::Boolean(a), Value::Boolean(b)) => a == b,
                (Value::String(a), Value::String(b)) => a == b,
                _ => match numeric_pair(&left, &right) {
                    Some(Numeric::Ints(a, b)) => a == b,
                    Some(Numeric::Floats(a, b)) => a == b,
                    None => return Err(fault(instruction, &left, &right)),
                },
            };
            Value::Boolean(equal)
        }
        And | Or => match (&left, &right) {
            (Value::Boolean(a), Value::Boolean(b)) => {
                Value::Boolean(if matches!(instruction, And) {
                    *a && *b
                } else {
                    *a || *b
                })
            }
            _ => return Err(fault(instruction, &left, &right)),
        },
        Concat => match (left, right) {
            (Value::String(mut a), Value::String(b)) => {
                a.push_str(&b);
                Value::String(a)
            }
            (left, right) => return Err(fault(instruction, &left, &right)),
        },
        other => {
            return Err(ExecutionError::TypeFault {
                instruction: other.mnemonic(),
                operands: "two operands".to_string(),
            });
        }
    };

    Ok(result)
}

fn eval_binary_int(
    instruction: &Instruction,
    left: i64,
    right: i64,
) -> Result<i64, ExecutionError> {
    match instruction {
        Instruction::Add(_) => Ok(left.wrapping_add(right)),
        Instruction::Sub(_) => Ok(left.wrapping_sub(right)),
        Instruction::Mul(_) => Ok(left.wrapping_mul(right)),
        _ => {
            if right == 0 {
                Err(ExecutionError::DivisionByZero)
            } else {
                // Use wrapping_div to handle i64::MIN / -1 case
                Ok(left.wrapping_div(right))
            }
        }
    }
}

fn eval_binary_float(instruction: &Instruction, left: f64, right: f64) -> f64 {
    match instruction {
        Instruction::Add(_) => left + right,
        Instruction::Sub(_) => left - right,
        Instruction::Mul(_) => left * right,
        _ => left / right, // Division by zero produces inf
    }
}
