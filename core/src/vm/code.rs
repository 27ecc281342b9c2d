use core::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::error::DecodeError;
use super::instruction_set::Instruction;

/// A compiled program: a flat instruction list.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Code {
    pub instructions: Vec<Instruction>,
}

impl Code {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    /// Maps each label number to the index of its `Label` instruction.
    /// When a label appears twice the first occurrence wins.
    pub fn label_table(&self) -> HashMap<u32, usize> {
        let mut table = HashMap::new();
        for (index, instruction) in self.instructions.iter().enumerate() {
            if let Instruction::Label(n) = instruction {
                table.entry(*n).or_insert(index);
            }
        }
        table
    }

    /// Textual listing, one instruction per line.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for instruction in &self.instructions {
            text.push_str(&instruction.to_string());
            text.push('\n');
        }
        text
    }

    /// Parses a textual listing. Blank lines are skipped.
    pub fn from_text(text: &str) -> Result<Self, DecodeError> {
        let mut instructions = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let instruction = line.parse().map_err(|source| DecodeError::Text {
                line: index + 1,
                source,
            })?;
            instructions.push(instruction);
        }
        tracing::debug!(count = instructions.len(), "Decoded textual bytecode");
        Ok(Self { instructions })
    }

    /// Compact binary form (postcard).
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let code: Code = postcard::from_bytes(bytes)?;
        tracing::debug!(count = code.instructions.len(), "Decoded binary bytecode");
        Ok(code)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Code {{")?;
        writeln!(f, "  instructions:")?;

        let labels = self.label_table();
        for (addr, instr) in self.instructions.iter().enumerate() {
            let label_prefix = match instr {
                Instruction::Label(n) => format!("L{n}:"),
                _ => String::new(),
            };

            // Jumps show where they land
            if let Some(label) = instr.jump_target() {
                let target = labels
                    .get(&label)
                    .map(|addr| format!("@{addr}"))
                    .unwrap_or_else(|| "unresolved".to_string());
                writeln!(f, "    {addr:4} {label_prefix:>5}  {instr} (to {target})")?;
            } else {
                writeln!(f, "    {addr:4} {label_prefix:>5}  {instr}")?;
            }
        }

        write!(f, "}}")
    }
}
