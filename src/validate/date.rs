//! Date field validation (§4.C): `year` must be a plausible four-digit year, and `month`, if a
//! name rather than a BibTeX macro, must be a recognized English month name or abbreviation.
use chrono::Datelike;

use crate::entry::{Severity, ValidationResult};

const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Validate a `year` field: must be a four-digit year no more than one year in the future
/// (allows for in-press/forthcoming entries dated to next year) and not implausibly old.
pub fn validate_year(year: i32) -> ValidationResult {
    let current = chrono::Utc::now().year();
    if (1450..=current + 1).contains(&year) {
        ValidationResult::ok("year", year.to_string())
    } else {
        ValidationResult::invalid(
            "year",
            Some(year.to_string()),
            Severity::Warning,
            "year is outside the plausible publication range",
        )
    }
}

/// Validate a `month` field: accepts a full month name or a three-letter abbreviation,
/// case-insensitively (BibTeX macro references like `jan` already resolve before this runs).
pub fn validate_month(value: &str) -> ValidationResult {
    let lower = value.trim().to_ascii_lowercase();
    let ok = MONTH_NAMES.iter().any(|m| *m == lower || m.starts_with(&lower) && lower.len() == 3);
    if ok {
        ValidationResult::ok("month", value)
    } else {
        ValidationResult::invalid(
            "month",
            Some(value.to_owned()),
            Severity::Warning,
            "month is not a recognized month name or abbreviation",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plausible_year() {
        assert!(validate_year(2024).valid);
    }

    #[test]
    fn rejects_implausible_year() {
        assert!(!validate_year(12).valid);
        assert!(!validate_year(3000).valid);
    }

    #[test]
    fn accepts_month_name_and_abbreviation() {
        assert!(validate_month("January").valid);
        assert!(validate_month("jan").valid);
    }

    #[test]
    fn rejects_unrecognized_month() {
        assert!(!validate_month("Smarch").valid);
    }
}
