//! DOI format validation (§4.C). DOIs are registry-resolved identifiers, not checksummed, so
//! validation is necessarily a syntax check against the `10.NNNN/suffix` shape.
use regex::Regex;
use std::sync::LazyLock;

use crate::entry::{Severity, ValidationResult};

static DOI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^10\.\d{4,}/\S+$").expect("static DOI regex"));
static DOI_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(doi:|https?://(dx\.)?doi\.org/)").expect("static DOI prefix regex"));

pub fn validate_doi(value: &str) -> ValidationResult {
    let trimmed = DOI_PREFIX_RE.replace(value.trim(), "");
    if DOI_RE.is_match(&trimmed) {
        ValidationResult::ok("doi", value)
    } else {
        ValidationResult::invalid(
            "doi",
            Some(value.to_owned()),
            Severity::Error,
            "DOI does not match the `10.NNNN/suffix` shape",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_typical_doi() {
        assert!(validate_doi("10.1000/xyz123").valid);
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(!validate_doi("xyz123").valid);
    }

    #[test]
    fn rejects_short_registrant_code() {
        assert!(!validate_doi("10.1/x").valid);
    }

    #[test]
    fn strips_the_doi_colon_prefix() {
        assert!(validate_doi("doi:10.1038/x").valid);
    }

    #[test]
    fn strips_the_resolver_url_prefix() {
        assert!(validate_doi("https://doi.org/10.1038/x").valid);
        assert!(validate_doi("https://dx.doi.org/10.1038/x").valid);
    }

    #[test]
    fn accepts_an_open_ended_registrant_code() {
        assert!(validate_doi("10.123456789012/x").valid);
    }
}
