//! Field-conflict merge strategies for combining duplicate entries into one (§4.E).
use nonempty::NonEmpty;

use crate::entry::{Entry, Fields};

/// How to resolve a field-level conflict when merging duplicates (§4.E).
#[derive(Clone, Copy)]
pub enum MergeStrategy<'a> {
    /// Keep the first non-empty value encountered, in group order.
    PreferFirst,
    /// Keep the most recently modified entry's value.
    PreferNewest,
    /// Concatenate distinct values (used for `keywords`; scalar fields fall back to
    /// [`MergeStrategy::PreferFirst`]).
    Union,
    /// Keep a field's value only when every entry in the group agrees.
    Intersection,
    /// A caller-supplied resolver, given the field name and every non-empty value present in
    /// the group in order, returning the value to keep (§4.E "Custom — caller-supplied
    /// resolver per field/values").
    Custom(&'a dyn Fn(&str, &[String]) -> Option<String>),
}

impl std::fmt::Debug for MergeStrategy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreferFirst => f.write_str("PreferFirst"),
            Self::PreferNewest => f.write_str("PreferNewest"),
            Self::Union => f.write_str("Union"),
            Self::Intersection => f.write_str("Intersection"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Merge a non-empty group of entries into one, applying `strategy` to every scalar field and
/// always unioning `keywords` (§4.E "merge closure/idempotence" property in the test plan: the
/// merge of a single-entry group is that entry unchanged).
pub fn merge_entries(group: &NonEmpty<Entry>, strategy: MergeStrategy<'_>) -> Entry {
    let primary = primary_entry(group, strategy);
    let mut fields = Fields::default();

    for name in crate::entry::FIELD_NAMES {
        if *name == "keywords" {
            continue;
        }
        let values: Vec<String> =
            group.iter().filter_map(|e| e.fields.get(name)).collect();
        if values.is_empty() {
            continue;
        }
        let chosen = match strategy {
            MergeStrategy::PreferFirst => Some(values[0].clone()),
            MergeStrategy::PreferNewest => primary.fields.get(name).or_else(|| Some(values[0].clone())),
            MergeStrategy::Union => Some(values[0].clone()),
            MergeStrategy::Intersection => {
                if values.iter().all(|v| v == &values[0]) {
                    Some(values[0].clone())
                } else {
                    None
                }
            }
            MergeStrategy::Custom(resolver) => resolver(name, &values),
        };
        if let Some(value) = chosen {
            fields.set(name, value);
        }
    }

    let mut keywords: Vec<String> = Vec::new();
    for e in group.iter() {
        for kw in &e.fields.keywords {
            if !keywords.contains(kw) {
                keywords.push(kw.clone());
            }
        }
    }
    fields.keywords = keywords;

    let mut merged = Entry::new(primary.key.clone(), primary.entry_type, fields);
    merged.created_at = group.iter().map(|e| e.created_at).min().unwrap_or(merged.created_at);
    merged
}

fn primary_entry<'a>(group: &'a NonEmpty<Entry>, strategy: MergeStrategy<'_>) -> &'a Entry {
    match strategy {
        MergeStrategy::PreferNewest => {
            group.iter().max_by_key(|e| e.modified_at).unwrap_or(&group.head)
        }
        _ => &group.head,
    }
}
