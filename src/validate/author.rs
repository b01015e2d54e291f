//! Author field validation (§4.C): structural sanity-checks on an author/editor list rather
//! than name-format enforcement, since BibTeX accepts both "Last, First" and "First Last".
use crate::entry::{split_author_list, Severity, ValidationResult};

pub fn validate_author(value: &str) -> ValidationResult {
    let names = split_author_list(value);
    if names.is_empty() {
        return ValidationResult::invalid(
            "author",
            Some(value.to_owned()),
            Severity::Error,
            "author field did not yield any names",
        );
    }
    ValidationResult::ok("author", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_simple_list() {
        assert!(validate_author("Smith, John and Doe, Jane").valid);
    }

    #[test]
    fn rejects_empty_value() {
        assert!(!validate_author("").valid);
    }
}
