//! Quality report assembly (§4.D): runs a [`RuleSet`] over a collection, adds the
//! collection-wide consistency checks (including duplicate-detection delegation), and
//! summarizes the result.
use std::collections::{BTreeMap, HashSet};

use crate::dedupe::{DetectorConfig, DuplicateDetector};
use crate::entry::{Collection, DuplicateMatch, Entry, Severity, ValidationResult, FIELD_NAMES};

use super::cache::{CacheStats, QualityCache};
use super::consistency::{check_crossref_cycles, check_crossref_resolution, find_orphaned_entries};
use super::rules::RuleSet;

/// Per-entry and collection-wide validation results, plus a pass/fail summary (§4.D).
#[derive(Debug, Clone, Default)]
pub struct QualityReport {
    pub per_entry: Vec<(String, Vec<ValidationResult>)>,
    pub consistency: Vec<ValidationResult>,
    /// Duplicate clusters found by delegating to the §4.E matcher (§4.D "Duplicate detection
    /// — delegates to §4.E").
    pub duplicates: Vec<DuplicateMatch>,
    pub cache_stats: CacheStats,
    /// Fraction (0.0-1.0) of entries with a non-empty value for each field that appeared on
    /// at least one entry (§4.D "field completeness per field").
    pub field_completeness: BTreeMap<String, f64>,
    /// Count of invalid results by their message, across entries and consistency checks
    /// (§4.D "common-issue histogram").
    pub issue_histogram: BTreeMap<String, usize>,
}

impl QualityReport {
    /// Every invalid result at [`Severity::Error`] or above, across entries and consistency
    /// checks.
    pub fn errors(&self) -> Vec<&ValidationResult> {
        self.per_entry
            .iter()
            .flat_map(|(_, results)| results)
            .chain(self.consistency.iter())
            .filter(|r| !r.valid && r.severity == Severity::Error)
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.errors().is_empty()
    }

    pub fn total_issues(&self) -> usize {
        self.per_entry.iter().map(|(_, r)| r.iter().filter(|r| !r.valid).count()).sum::<usize>()
            + self.consistency.iter().filter(|r| !r.valid).count()
    }

    /// `100 * valid / total` over per-entry results, or `100.0` when there is nothing to
    /// validate (§4.D "quality score").
    pub fn quality_score(&self) -> f64 {
        let (valid, total) = self
            .per_entry
            .iter()
            .flat_map(|(_, results)| results)
            .fold((0usize, 0usize), |(valid, total), r| (valid + usize::from(r.valid), total + 1));
        if total == 0 {
            100.0
        } else {
            100.0 * valid as f64 / total as f64
        }
    }
}

fn field_completeness(entries: &[Entry]) -> BTreeMap<String, f64> {
    if entries.is_empty() {
        return BTreeMap::new();
    }
    let mut completeness = BTreeMap::new();
    for field in FIELD_NAMES {
        let present = entries.iter().filter(|e| e.fields.get(field).is_some_and(|v| !v.is_empty())).count();
        completeness.insert((*field).to_owned(), present as f64 / entries.len() as f64);
    }
    completeness
}

fn issue_histogram<'a>(
    per_entry: &'a [(String, Vec<ValidationResult>)],
    consistency: &'a [ValidationResult],
) -> BTreeMap<String, usize> {
    let mut histogram = BTreeMap::new();
    for result in per_entry.iter().flat_map(|(_, r)| r).chain(consistency.iter()).filter(|r| !r.valid) {
        *histogram.entry(result.message.clone()).or_insert(0) += 1;
    }
    histogram
}

/// Runs `rules` over every entry (through `cache`, when given), appends the collection-wide
/// consistency checks, and delegates duplicate detection to §4.E. `collections` and
/// `citation_keys` feed orphan detection; pass an empty slice/set when neither is available
/// (§4.D).
pub fn build_report(
    entries: &[Entry],
    rules: &RuleSet,
    cache: Option<&mut QualityCache>,
    collections: &[Collection],
    citation_keys: &HashSet<String>,
) -> QualityReport {
    let mut per_entry = Vec::with_capacity(entries.len());

    let cache_stats = match cache {
        Some(cache) => {
            for entry in entries {
                let results = cache.get_or_compute(entry, |e| rules.run(e));
                per_entry.push((entry.key.as_str().to_owned(), results));
            }
            cache.stats()
        }
        None => {
            for entry in entries {
                per_entry.push((entry.key.as_str().to_owned(), rules.run(entry)));
            }
            CacheStats::default()
        }
    };

    let mut consistency = check_crossref_resolution(entries);
    consistency.extend(check_crossref_cycles(entries));
    consistency.extend(find_orphaned_entries(entries, collections, citation_keys));

    let duplicates = DuplicateDetector::new(DetectorConfig::default()).find_duplicates(entries);

    let field_completeness = field_completeness(entries);
    let issue_histogram = issue_histogram(&per_entry, &consistency);

    QualityReport {
        per_entry,
        consistency,
        duplicates,
        cache_stats,
        field_completeness,
        issue_histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};

    #[test]
    fn report_aggregates_per_entry_and_consistency_results() {
        let mut fields = Fields::default();
        fields.set("crossref", "missing");
        let entry = Entry::new(EntryKey::new("a").unwrap(), EntryType::Inproceedings, fields);
        let report = build_report(&[entry], &RuleSet::standard(), None, &[], &HashSet::new());
        assert!(!report.consistency.is_empty());
        assert!(!report.is_clean());
    }

    #[test]
    fn report_surfaces_duplicate_matches() {
        let mut a = Fields::default();
        a.set("doi", "10.1/x");
        let mut b = Fields::default();
        b.set("doi", "10.1/x");
        let entries =
            vec![Entry::new(EntryKey::new("a").unwrap(), EntryType::Article, a),
                 Entry::new(EntryKey::new("b").unwrap(), EntryType::Article, b)];
        let report = build_report(&entries, &RuleSet::standard(), None, &[], &HashSet::new());
        assert_eq!(report.duplicates.len(), 1);
    }
}
