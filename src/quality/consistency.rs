//! Cross-entry consistency checks (§4.D): `crossref` resolution, cycle detection, orphan
//! detection, and duplicate delegation.
use std::collections::{HashMap, HashSet};

use crate::entry::{Collection, CollectionMembers, Entry, Severity, ValidationResult};

/// Every `crossref` must point to a key present in `entries`; unresolved references error
/// (§4.D "Cross-reference resolution").
pub fn check_crossref_resolution(entries: &[Entry]) -> Vec<ValidationResult> {
    let keys: HashSet<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    entries
        .iter()
        .filter_map(|e| {
            let target = e.fields.crossref.as_deref()?;
            if keys.contains(target) {
                None
            } else {
                Some(ValidationResult::invalid(
                    "crossref",
                    Some(target.to_owned()),
                    Severity::Error,
                    format!("entry '{}' references missing crossref '{}'", e.key, target),
                ))
            }
        })
        .collect()
}

/// Follows each entry's `crossref` chain via DFS; any cycle is reported with its full member
/// list (§4.D "Cycle detection"). A chain that dead-ends at a key absent from `entries` is left
/// to [`check_crossref_resolution`] and is not itself reported here.
pub fn check_crossref_cycles(entries: &[Entry]) -> Vec<ValidationResult> {
    let keys: HashSet<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    let parent: HashMap<&str, Option<&str>> = entries
        .iter()
        .map(|e| (e.key.as_str(), e.fields.crossref.as_deref()))
        .collect();

    let mut results = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();

    for start in parent.keys() {
        if visited.contains(start) {
            continue;
        }
        let mut path: Vec<&str> = Vec::new();
        let mut path_set: HashSet<&str> = HashSet::new();
        let mut current = *start;

        loop {
            if path_set.contains(current) {
                for node in &path {
                    visited.insert(node);
                }
                results.push(ValidationResult::invalid(
                    "crossref",
                    Some(current.to_owned()),
                    Severity::Error,
                    format!("crossref cycle detected: {}", path.join(" -> ")),
                ));
                break;
            }
            if visited.contains(current) {
                for node in path {
                    visited.insert(node);
                }
                break;
            }
            path.push(current);
            path_set.insert(current);

            match parent.get(current) {
                Some(Some(next)) if keys.contains(next) => {
                    current = next;
                }
                _ => {
                    for node in path {
                        visited.insert(node);
                    }
                    break;
                }
            }
        }
    }

    results
}

/// An entry is orphaned if it is neither referenced via any other entry's `crossref`, nor a
/// member of any (manual) collection, nor present in `citation_keys` — an externally supplied
/// set of keys actually cited somewhere (e.g. a manuscript's bibliography). Smart collections
/// are query-defined and are not evaluated here; only manual membership counts. Reported at
/// [`Severity::Info`] by default (§4.D "Orphan detection").
pub fn find_orphaned_entries(
    entries: &[Entry],
    collections: &[Collection],
    citation_keys: &HashSet<String>,
) -> Vec<ValidationResult> {
    let referenced: HashSet<&str> =
        entries.iter().filter_map(|e| e.fields.crossref.as_deref()).collect();
    let collected: HashSet<&str> = collections
        .iter()
        .filter_map(|c| match &c.members {
            CollectionMembers::Manual(members) => Some(members.iter().map(String::as_str)),
            CollectionMembers::Smart(_) => None,
        })
        .flatten()
        .collect();

    entries
        .iter()
        .filter(|e| {
            !referenced.contains(e.key.as_str())
                && !collected.contains(e.key.as_str())
                && !citation_keys.contains(e.key.as_str())
        })
        .map(|e| {
            ValidationResult::invalid(
                "key",
                Some(e.key.as_str().to_owned()),
                Severity::Info,
                format!("entry '{}' is not referenced by crossref, a collection, or any citation set", e.key),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};

    fn entry_with_crossref(key: &str, crossref: Option<&str>) -> Entry {
        let mut fields = Fields::default();
        if let Some(c) = crossref {
            fields.set("crossref", c);
        }
        Entry::new(EntryKey::new(key).unwrap(), EntryType::Inproceedings, fields)
    }

    #[test]
    fn detects_a_direct_cycle() {
        let entries = vec![
            entry_with_crossref("a", Some("b")),
            entry_with_crossref("b", Some("a")),
        ];
        let results = check_crossref_cycles(&entries);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn accepts_a_valid_chain() {
        let entries = vec![
            entry_with_crossref("a", Some("b")),
            entry_with_crossref("b", None),
        ];
        assert!(check_crossref_cycles(&entries).is_empty());
    }

    #[test]
    fn flags_a_missing_crossref_target() {
        let entries = vec![entry_with_crossref("a", Some("missing"))];
        let results = check_crossref_resolution(&entries);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].severity, Severity::Error);
    }

    #[test]
    fn cycle_detection_ignores_a_chain_that_dead_ends_at_a_missing_target() {
        let entries = vec![entry_with_crossref("a", Some("missing"))];
        assert!(check_crossref_cycles(&entries).is_empty());
    }

    #[test]
    fn orphan_detection_flags_entries_unreferenced_anywhere() {
        let entries = vec![entry_with_crossref("a", Some("b")), entry_with_crossref("b", None)];
        let results = find_orphaned_entries(&entries, &[], &HashSet::new());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value.as_deref(), Some("a"));
        assert_eq!(results[0].severity, Severity::Info);
    }

    #[test]
    fn orphan_detection_exempts_collection_members_and_cited_keys() {
        let entries = vec![entry_with_crossref("a", None), entry_with_crossref("b", None)];
        let collection = Collection::new_manual("c1", "Reading list").with_member_added("a");
        let citations = HashSet::from(["b".to_string()]);
        let results = find_orphaned_entries(&entries, &[collection], &citations);
        assert!(results.is_empty());
    }
}
