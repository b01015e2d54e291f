//! ISSN checksum validation (§4.C). Format: `NNNN-NNNC` where `C` is a mod-11 check digit.
use crate::entry::{Severity, ValidationResult};

fn checksum_ok(digits: &str) -> bool {
    if digits.len() != 8 {
        return false;
    }
    let mut sum = 0i32;
    for (i, c) in digits.chars().enumerate() {
        let value = if i == 7 && c.eq_ignore_ascii_case(&'X') {
            10
        } else if let Some(d) = c.to_digit(10) {
            d as i32
        } else {
            return false;
        };
        sum += (8 - i as i32) * value;
    }
    sum % 11 == 0
}

pub fn validate_issn(value: &str) -> ValidationResult {
    let digits: String = value.chars().filter(|c| *c != '-').collect();
    if checksum_ok(&digits) {
        ValidationResult::ok("issn", value)
    } else {
        ValidationResult::invalid(
            "issn",
            Some(value.to_owned()),
            Severity::Error,
            "ISSN checksum does not match",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_good_issn() {
        assert!(validate_issn("2049-3630").valid);
    }

    #[test]
    fn rejects_bad_checksum() {
        assert!(!validate_issn("2049-3631").valid);
    }
}
