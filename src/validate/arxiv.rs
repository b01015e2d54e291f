//! arXiv identifier format validation (§4.C). Covers both the modern `YYMM.NNNNN[vN]` scheme
//! (April 2007 onward) and the legacy `archive.subject-class/YYMMNNN` scheme.
use regex::Regex;
use std::sync::LazyLock;

use crate::entry::{Severity, ValidationResult};

static MODERN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}(0[1-9]|1[0-2])\.\d{4,5}(v\d+)?$").expect("static arXiv regex"));
static LEGACY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z-]+(\.[A-Z]{2})?/\d{7}(v\d+)?$").expect("static arXiv legacy regex")
});
static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(arxiv:|https?://arxiv\.org/abs/)").expect("static arXiv prefix regex"));

pub fn validate_arxiv(value: &str) -> ValidationResult {
    let trimmed = PREFIX_RE.replace(value.trim(), "");
    if MODERN_RE.is_match(&trimmed) || LEGACY_RE.is_match(&trimmed) {
        ValidationResult::ok("eprint", value)
    } else {
        ValidationResult::invalid(
            "eprint",
            Some(value.to_owned()),
            Severity::Error,
            "arXiv identifier does not match a recognized scheme",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_modern_identifier() {
        assert!(validate_arxiv("2101.00001").valid);
        assert!(validate_arxiv("arXiv:2101.00001v2").valid);
    }

    #[test]
    fn accepts_legacy_identifier() {
        assert!(validate_arxiv("hep-th/9901001").valid);
    }

    #[test]
    fn rejects_malformed_identifier() {
        assert!(!validate_arxiv("not an id").valid);
    }

    #[test]
    fn strips_the_abs_url_prefix() {
        assert!(validate_arxiv("https://arxiv.org/abs/2101.00001").valid);
    }

    #[test]
    fn rejects_an_out_of_range_month() {
        assert!(!validate_arxiv("2113.00001").valid);
    }
}
