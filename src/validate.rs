//! # Field validators (§4.C)
//! Per-field syntax/checksum validators, plus an entry-level [`validate_entry`] that dispatches
//! the fields present on an [`Entry`] to the validator for that field name and appends the
//! required-field check from [`Entry::required_field_groups`].
mod arxiv;
mod author;
mod date;
mod doi;
mod isbn;
mod issn;
mod orcid;
mod pages;
mod url;

pub use arxiv::validate_arxiv;
pub use author::validate_author;
pub use date::{validate_month, validate_year};
pub use doi::validate_doi;
pub use isbn::validate_isbn;
pub use issn::validate_issn;
pub use orcid::validate_orcid;
pub use pages::validate_pages;
pub use url::validate_url;

use crate::entry::{Entry, Severity, ValidationResult};

/// Validate every field on `entry` that has a dedicated validator, plus the required-field
/// groups for its entry type. Fields with no dedicated validator (e.g. free-text `note`) are
/// not included in the result.
pub fn validate_entry(entry: &Entry) -> Vec<ValidationResult> {
    let mut results = Vec::new();
    let f = &entry.fields;

    if let Some(v) = &f.isbn {
        results.push(validate_isbn(v));
    }
    if let Some(v) = &f.issn {
        results.push(validate_issn(v));
    }
    if let Some(v) = &f.doi {
        results.push(validate_doi(v));
    }
    if let Some(v) = &f.url {
        results.push(validate_url(v));
    }
    if let Some(v) = &f.eprint {
        results.push(validate_arxiv(v));
    }
    if let Some(y) = f.year {
        results.push(validate_year(y));
    }
    if let Some(v) = &f.month {
        results.push(validate_month(v));
    }
    if let Some(v) = &f.author {
        results.push(validate_author(v));
    }
    if let Some(v) = &f.pages {
        results.push(validate_pages(v));
    }

    for group in Entry::required_field_groups(entry.entry_type) {
        let satisfied = group.iter().any(|name| f.get(name).is_some());
        if !satisfied {
            results.push(ValidationResult::invalid(
                group[0],
                None,
                Severity::Error,
                format!(
                    "missing required field for {}: one of {:?}",
                    entry.entry_type, group
                ),
            ));
        }
    }

    results
}
