use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a [`ValidationResult`] (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Suggestion,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Suggestion => "suggestion",
        })
    }
}

/// The outcome of validating a single field (or, for quality/consistency rules, a single
/// applicability check) against an entry (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub field: String,
    pub value: Option<String>,
    pub valid: bool,
    pub severity: Severity,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationResult {
    pub fn ok(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: Some(value.into()),
            valid: true,
            severity: Severity::Info,
            message: String::new(),
            suggestion: None,
        }
    }

    pub fn invalid(
        field: impl Into<String>,
        value: Option<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value,
            valid: false,
            severity,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}
