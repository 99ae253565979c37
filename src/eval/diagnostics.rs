//! Collector for accumulating diagnostics during a build.
//!
//! DSL calls never return errors to their caller. Each failure is recorded
//! here together with the path of the node being built, so one build
//! surfaces every defect.

use std::fmt;

use tracing::warn;

use crate::domain::{DomainError, ErrorKind};
use crate::eval::error::EvalError;

/// A single recorded failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    error: DomainError,
    path: String,
}

impl Diagnostic {
    pub fn new(error: DomainError, path: impl Into<String>) -> Self {
        Self {
            error,
            path: path.into(),
        }
    }

    pub fn error(&self) -> &DomainError {
        &self.error
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// Rendered evaluation stack at the time of the failure.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind(), self.path, self.error)
    }
}

/// Build-wide list of diagnostics in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        warn!(kind = %diagnostic.kind(), path = diagnostic.path(), "{}", diagnostic.error());
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn count(&self, kind: ErrorKind) -> usize {
        self.entries.iter().filter(|d| d.kind() == kind).count()
    }

    pub fn has_fatal(&self) -> bool {
        self.entries.iter().any(|d| d.error().is_fatal())
    }

    /// - No diagnostics: `Ok(())`
    /// - Otherwise: `Err(EvalError::Build)` carrying all of them
    pub fn finish(self) -> Result<(), EvalError> {
        if self.entries.is_empty() {
            Ok(())
        } else {
            Err(EvalError::build(self))
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
