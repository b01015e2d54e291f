//! ORCID iD checksum validation (§4.C). Format: four groups of four digits, the last digit of
//! the last group being a mod-11-2 check character (digit or `X`), per the ISO 7064 11,2 scheme.
use crate::entry::{Severity, ValidationResult};

fn checksum_ok(digits_and_check: &str) -> bool {
    if digits_and_check.len() != 16 {
        return false;
    }
    let chars: Vec<char> = digits_and_check.chars().collect();
    let mut total: u32 = 0;
    for c in &chars[..15] {
        let Some(d) = c.to_digit(10) else { return false };
        total = (total + d) * 2;
    }
    let remainder = total % 11;
    let check = (12 - remainder) % 11;
    let expected = if check == 10 { 'X' } else { char::from_digit(check, 10).unwrap() };
    chars[15].to_ascii_uppercase() == expected
}

pub fn validate_orcid(value: &str) -> ValidationResult {
    let trimmed = value.trim().trim_start_matches("https://orcid.org/");
    let compact: String = trimmed.chars().filter(|c| *c != '-').collect();
    if checksum_ok(&compact) {
        ValidationResult::ok("orcid", value)
    } else {
        ValidationResult::invalid(
            "orcid",
            Some(value.to_owned()),
            Severity::Error,
            "ORCID iD checksum does not match",
        )
    }
}
