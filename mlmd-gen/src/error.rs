//! Error types for generation runs

use std::fmt;
use std::path::PathBuf;

/// Fatal errors that abort a generation run.
///
/// Recoverable conditions (unknown language codes, unbalanced directives,
/// bad variable syntax) never surface here; they are collected as
/// [`Diagnostic`](crate::report::Diagnostic) values and processing goes on.
#[derive(Debug)]
pub enum GenError {
    /// A file could not be opened or created
    Io { path: PathBuf, source: std::io::Error },
    /// An input file does not carry a template extension (.mlmd / .base.md)
    InvalidExtension(PathBuf),
    /// No template file was given or found
    NoInput,
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::Io { path, source } => {
                write!(f, "I/O error on '{}': {source}", path.display())
            }
            GenError::InvalidExtension(path) => {
                write!(
                    f,
                    "'{}' is not a template file (expected .mlmd or .base.md)",
                    path.display()
                )
            }
            GenError::NoInput => write!(f, "no template file to process"),
        }
    }
}

impl std::error::Error for GenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl GenError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
