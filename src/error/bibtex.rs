use std::fmt;

use thiserror::Error;

/// Severity of a single parse diagnostic (§4.B "Error recovery").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BibtexErrorKind {
    /// The parser could not make sense of the input and had to resynchronize.
    Error,
    /// The input was accepted, but under a relaxed interpretation (e.g. a synthesized key,
    /// an unknown entry type coerced to `misc`, a duplicate citation key).
    Warning,
}

impl fmt::Display for BibtexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

/// A single diagnostic raised while parsing, carrying enough position information to point a
/// caller at the offending region (§8 "Parser robustness").
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {line}:{column}: {message}")]
pub struct BibtexError {
    pub line: usize,
    pub column: usize,
    pub kind: BibtexErrorKind,
    pub message: String,
}

impl BibtexError {
    pub fn error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            kind: BibtexErrorKind::Error,
            message: message.into(),
        }
    }

    pub fn warning(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            kind: BibtexErrorKind::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == BibtexErrorKind::Error
    }
}
