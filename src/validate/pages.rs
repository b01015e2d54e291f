//! Page range validation (§4.C): a single page number, or a `start--end`/`start-end` range
//! with `end >= start` when both sides are numeric.
use crate::entry::{Severity, ValidationResult};

pub fn validate_pages(value: &str) -> ValidationResult {
    let trimmed = value.trim();
    let parts: Vec<&str> = trimmed.splitn(2, "--").collect();
    let (start, end) = if parts.len() == 2 {
        (parts[0], Some(parts[1]))
    } else {
        let parts: Vec<&str> = trimmed.splitn(2, '-').collect();
        if parts.len() == 2 {
            (parts[0], Some(parts[1]))
        } else {
            (trimmed, None)
        }
    };
    if start.trim().is_empty() {
        return ValidationResult::invalid(
            "pages",
            Some(value.to_owned()),
            Severity::Error,
            "pages field is empty",
        );
    }
    if let Some(end) = end {
        if let (Ok(s), Ok(e)) = (start.trim().parse::<u32>(), end.trim().parse::<u32>()) {
            if e < s {
                return ValidationResult::invalid(
                    "pages",
                    Some(value.to_owned()),
                    Severity::Error,
                    "page range ends before it starts",
                );
            }
        }
    }
    ValidationResult::ok("pages", value)
}
