//! URL syntax validation (§4.C). A pragmatic scheme/host check rather than full RFC 3986
//! conformance, matching the level of rigor the rest of the field validators aim for.
use crate::entry::{Severity, ValidationResult};

pub fn validate_url(value: &str) -> ValidationResult {
    let trimmed = value.trim();
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    match rest {
        Some(rest) if !rest.is_empty() && rest.chars().next().is_some_and(|c| c != '/') => {
            ValidationResult::ok("url", value)
        }
        _ => ValidationResult::invalid(
            "url",
            Some(value.to_owned()),
            Severity::Error,
            "URL must start with http:// or https:// and include a host",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_url() {
        assert!(validate_url("https://example.com/paper.pdf").valid);
    }

    #[test]
    fn rejects_missing_scheme() {
        assert!(!validate_url("example.com").valid);
    }

    #[test]
    fn rejects_empty_host() {
        assert!(!validate_url("https://").valid);
    }
}
