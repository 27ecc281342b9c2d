use std::io::{BufRead, Write};

use hashbrown::HashMap;
use tracing::{debug, trace};

use super::operators::eval_binary;
use super::{Code, ExecutionError, Instruction, Stack, TypeTag, Value};
use crate::api::ExecutionOptions;
use crate::types::Type;

/// Stack machine executing a [`Code`] listing.
///
/// The VM reads `read` input line by line from `input` and writes `print`
/// output (and optional prompts) to `output`. Variables live in a single
/// global store keyed by name; there is no frame or scope structure.
pub struct VM<'c, R, W> {
    code: &'c Code,
    labels: HashMap<u32, usize>,
    options: ExecutionOptions,
    ip: usize,
    steps: usize,
    stack: Stack<Value>,
    variables: HashMap<String, Value>,
    input: R,
    output: W,
}

impl<'c, R: BufRead, W: Write> VM<'c, R, W> {
    pub fn new(code: &'c Code, options: ExecutionOptions, input: R, output: W) -> Self {
        let labels = code.label_table();
        debug!(
            instructions = code.len(),
            labels = labels.len(),
            "VM initialized"
        );
        VM {
            code,
            labels,
            stack: Stack::new(options.max_stack_depth),
            options,
            ip: 0,
            steps: 0,
            variables: HashMap::new(),
            input,
            output,
        }
    }

    /// Runs until the instruction pointer falls off the end of the program.
    pub fn run(&mut self) -> Result<(), ExecutionError> {
        loop {
            match self.step() {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => {
                    debug!(ip = self.ip, error = %err, "Execution fault");
                    return Err(err);
                }
            }
        }
        self.output.flush()?;
        debug!(steps = self.steps, "Execution finished");
        Ok(())
    }

    /// Executes one instruction. Returns `false` once the program has halted.
    pub fn step(&mut self) -> Result<bool, ExecutionError> {
        let code = self.code;
        let Some(instruction) = code.instructions.get(self.ip) else {
            return Ok(false);
        };

        if let Some(limit) = self.options.max_steps {
            if self.steps >= limit {
                return Err(ExecutionError::StepLimitExceeded { limit });
            }
        }
        self.steps += 1;

        trace!(ip = self.ip, %instruction, depth = self.stack.len(), "exec");

        let mut next = self.ip + 1;

        use Instruction::*;
        match instruction {
            Push(value) => self.stack.push(value.clone())?,
            Pop => {
                self.stack.pop()?;
            }
            Load(name) => {
                let value = self
                    .variables
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ExecutionError::UndefinedVariable { name: name.clone() })?;
                self.stack.push(value)?;
            }
            Save(name) => {
                let value = self.stack.pop()?;
                self.variables.insert(name.clone(), value);
            }
            Label(_) => {}
            Jmp(label) => next = self.resolve(*label)? + 1,
            FalseJmp(label) => {
                if !self.pop_bool(instruction)? {
                    next = self.resolve(*label)? + 1;
                }
            }
            Print(count) => {
                let values = self.stack.pop_n(*count)?;
                for value in &values {
                    write!(self.output, "{value}")?;
                }
                writeln!(self.output)?;
            }
            Read(tag) => {
                let value = self.read_value(*tag)?;
                self.stack.push(value)?;
            }
            Not => {
                let b = self.pop_bool(instruction)?;
                self.stack.push(Value::Boolean(!b))?;
            }
            Uminus => {
                let value = match self.stack.pop()? {
                    Value::Int(i) => Value::Int(i.wrapping_neg()),
                    Value::Float(x) => Value::Float(-x),
                    other => return Err(unary_fault(instruction, &other)),
                };
                self.stack.push(value)?;
            }
            ItoF => {
                let value = match self.stack.pop()? {
                    Value::Int(i) => Value::Float(i as f64),
                    other => return Err(unary_fault(instruction, &other)),
                };
                self.stack.push(value)?;
            }
            Add(_) | Sub(_) | Mul(_) | Div(_) | Mod | Concat | And | Or | Gt | Lt | Eq => {
                let right = self.stack.pop()?;
                let left = self.stack.pop()?;
                let result = eval_binary(instruction, left, right)?;
                self.stack.push(result)?;
            }
        }

        self.ip = next;
        Ok(true)
    }

    /// Index of the next instruction to execute.
    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Current value of a variable, if anything has been saved to it.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    fn resolve(&self, label: u32) -> Result<usize, ExecutionError> {
        self.labels
            .get(&label)
            .copied()
            .ok_or(ExecutionError::UnresolvedLabel(label))
    }

    fn pop_bool(&mut self, instruction: &Instruction) -> Result<bool, ExecutionError> {
        let value = self.stack.pop()?;
        value
            .as_bool()
            .ok_or_else(|| unary_fault(instruction, &value))
    }

    fn read_value(&mut self, tag: TypeTag) -> Result<Value, ExecutionError> {
        let expected = Type::from(tag);
        if self.options.prompt_on_read {
            writeln!(self.output, "Input {expected}:")?;
            self.output.flush()?;
        }

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ExecutionError::EndOfInput);
        }
        let text = line.trim_end_matches(['\n', '\r']);
        let invalid = || ExecutionError::InvalidInput {
            expected,
            text: text.to_string(),
        };

        let value = match tag {
            TypeTag::Int => Value::Int(text.trim().parse().map_err(|_| invalid())?),
            TypeTag::Float => Value::Float(text.trim().parse().map_err(|_| invalid())?),
            TypeTag::Boolean => {
                let word = text.trim();
                if word.eq_ignore_ascii_case("true") {
                    Value::Boolean(true)
                } else if word.eq_ignore_ascii_case("false") {
                    Value::Boolean(false)
                } else {
                    return Err(invalid());
                }
            }
            TypeTag::String => Value::String(text.to_string()),
        };
        trace!(%value, "read");
        Ok(value)
    }
}

fn unary_fault(instruction: &Instruction, operand: &Value) -> ExecutionError {
    ExecutionError::TypeFault {
        instruction: instruction.mnemonic(),
        operands: operand.type_name().to_string(),
    }
}
