//! Diagnostics collection
//!
//! The library never prints. Warnings and recoverable errors are pushed
//! into a [`Report`] that the caller inspects (or serializes) after the
//! run.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One message tied to an optional source location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "WARNING: ")?,
            Severity::Error => write!(f, "ERROR: ")?,
        }
        write!(f, "{}", self.message)?;
        if let Some(file) = &self.file {
            write!(f, " [{file}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Ordered collection of diagnostics for one run.
#[derive(Debug, Default)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
    errors: usize,
    warnings: usize,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>, file: Option<&str>, line: Option<usize>) {
        self.errors += 1;
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            file: file.map(str::to_owned),
            line,
        });
    }

    pub fn warning(&mut self, message: impl Into<String>, file: Option<&str>, line: Option<usize>) {
        self.warnings += 1;
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            file: file.map(str::to_owned),
            line,
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Appends every diagnostic of another report.
    pub fn merge(&mut self, other: Report) {
        self.errors += other.errors;
        self.warnings += other.warnings;
        self.diagnostics.extend(other.diagnostics);
    }
}
