//! ISBN-10 / ISBN-13 checksum validation (§4.C).
use crate::entry::{Severity, ValidationResult};

fn digits_and_hyphens_ok(raw: &str) -> bool {
    raw.chars().all(|c| c.is_ascii_digit() || c == '-' || c == ' ' || c == 'X' || c == 'x')
}

fn strip_separators(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect()
}

fn isbn10_checksum_ok(digits: &str) -> bool {
    if digits.len() != 10 {
        return false;
    }
    let mut sum = 0i32;
    for (i, c) in digits.chars().enumerate() {
        let value = if i == 9 && (c == 'X' || c == 'x') {
            10
        } else if let Some(d) = c.to_digit(10) {
            d as i32
        } else {
            return false;
        };
        sum += (10 - i as i32) * value;
    }
    sum % 11 == 0
}

fn isbn13_checksum_ok(digits: &str) -> bool {
    if digits.len() != 13
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || !(digits.starts_with("978") || digits.starts_with("979"))
    {
        return false;
    }
    let mut sum = 0i32;
    for (i, c) in digits.chars().enumerate() {
        let d = c.to_digit(10).unwrap() as i32;
        sum += if i % 2 == 0 { d } else { 3 * d };
    }
    sum % 10 == 0
}

/// Validate an ISBN field value (§4.C). Accepts ISBN-10 or ISBN-13, with or without hyphens.
pub fn validate_isbn(value: &str) -> ValidationResult {
    if !digits_and_hyphens_ok(value) {
        return ValidationResult::invalid(
            "isbn",
            Some(value.to_owned()),
            Severity::Error,
            "ISBN contains characters outside digits, hyphens, and a trailing X",
        );
    }
    let digits = strip_separators(value).to_ascii_uppercase();
    let ok = match digits.len() {
        10 => isbn10_checksum_ok(&digits),
        13 => isbn13_checksum_ok(&digits),
        _ => false,
    };
    if ok {
        ValidationResult::ok("isbn", value)
    } else {
        ValidationResult::invalid(
            "isbn",
            Some(value.to_owned()),
            Severity::Error,
            "ISBN checksum does not match",
        )
    }
}
