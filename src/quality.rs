//! # Quality engine (§4.D)
//! A rule registry (field validators plus cross-field correlation rules), collection-wide
//! consistency checks (crossref resolution/cycle/orphan detection, duplicate delegation), a
//! content-hash-keyed cache, and report assembly.
mod cache;
mod consistency;
mod report;
mod rules;

pub use cache::{CacheStats, QualityCache};
pub use consistency::{check_crossref_cycles, check_crossref_resolution, find_orphaned_entries};
pub use report::{build_report, QualityReport};
pub use rules::{
    ArticlePagesImplyVolumeRule, BookIsbnImpliesPublisherRule, FieldValidationRule,
    MiscEmptyUrlWarnsRule, Rule, RuleKind, RuleSet, ThesisRequiresSchoolRule,
};
