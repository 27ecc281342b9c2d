//! Flat symbol table: one global namespace for the whole program.

use hashbrown::HashMap;

use crate::types::Type;

/// Maps every declared variable to its static type.
///
/// There are no nested scopes and no shadowing. Once a name is declared its
/// type never changes; a second declaration is rejected and leaves the first
/// one in place.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, Type>,
}

/// Returned when a name is declared twice. Carries the type already bound.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AlreadyDeclared(pub Type);

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `ty`. Fails without touching the table if the name is
    /// already bound.
    pub fn declare(&mut self, name: &str, ty: Type) -> Result<(), AlreadyDeclared> {
        if let Some(&existing) = self.symbols.get(name) {
            return Err(AlreadyDeclared(existing));
        }
        self.symbols.insert(name.to_string(), ty);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Type> {
        self.symbols.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Entries sorted by name.
    pub fn entries(&self) -> Vec<(&str, Type)> {
        let mut entries: Vec<_> = self
            .symbols
            .iter()
            .map(|(name, ty)| (name.as_str(), *ty))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
