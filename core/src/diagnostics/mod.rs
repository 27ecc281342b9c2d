//! Diagnostics sink for the compiler.
//!
//! The collector is created by the caller, passed by `&mut` through the
//! compilation and inspected afterwards. Reporting never fails and never
//! stops compilation.

mod error;

use core::fmt;

pub use error::SemanticError;

use crate::ast::Location;

/// A semantic error and where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub location: Location,
    pub error: SemanticError,
}

impl Diagnostic {
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn code(&self) -> &'static str {
        self.error.code()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.location, self.error)
    }
}

/// Ordered list of diagnostics for one compilation unit.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, location: &Location, error: SemanticError) {
        tracing::debug!(%location, %error, "diagnostic");
        self.entries.push(Diagnostic {
            location: location.clone(),
            error,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Take every diagnostic reported so far, leaving the collector empty.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        core::mem::take(&mut self.entries)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = core::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
