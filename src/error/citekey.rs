use thiserror::Error;

/// Errors raised by the citation-key generator (§4.F).
///
/// Per §7, these are programmer-facing failures: an invalid pattern at construction, or
/// collision resolution exhausting its attempt budget. A generator is never asked to produce
/// a key without an answer silently; exhaustion is always reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CitekeyError {
    #[error("invalid key pattern at offset {offset}: {message}")]
    InvalidPattern { offset: usize, message: String },
    #[error("collision resolution exhausted after {attempts} attempts for base key '{base}'")]
    ResolutionExhausted { base: String, attempts: u32 },
    #[error("generated key '{0}' failed sanitization")]
    SanitizationFailed(String),
}
