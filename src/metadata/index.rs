//! The tag -> entries inverted index (§4.I), rebuilt on startup by scanning metadata files and
//! diff-updated on every `save_metadata` call thereafter.
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// An in-memory inverted index from tag name to the set of entry keys carrying that tag.
#[derive(Debug, Default)]
pub struct TagIndex {
    map: HashMap<String, BTreeSet<String>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from scratch given every `(entry_key, tags)` pair on disk (§4.I "rebuilt on
    /// startup by scanning metadata files").
    pub fn rebuild<'a>(&mut self, records: impl Iterator<Item = (&'a str, &'a BTreeSet<String>)>) {
        self.map.clear();
        for (key, tags) in records {
            for tag in tags {
                self.map.entry(tag.clone()).or_default().insert(key.to_owned());
            }
        }
    }

    /// Apply the difference between `old_tags` and `new_tags` for `key`: removed tags
    /// decrement (and are pruned once empty), added tags increment (§4.I "diff-updates the
    /// index").
    pub fn diff_update(&mut self, key: &str, old_tags: &BTreeSet<String>, new_tags: &BTreeSet<String>) {
        for removed in old_tags.difference(new_tags) {
            if let Some(set) = self.map.get_mut(removed) {
                set.remove(key);
                if set.is_empty() {
                    self.map.remove(removed);
                }
            }
        }
        for added in new_tags.difference(old_tags) {
            self.map.entry(added.clone()).or_default().insert(key.to_owned());
        }
    }

    pub fn find_by_tag(&self, tag: &str) -> BTreeSet<String> {
        self.map.get(tag).cloned().unwrap_or_default()
    }

    /// Union (`match_all = false`) or intersection (`match_all = true`) of the entry sets for
    /// `tags` (§4.I "find-by-tags").
    pub fn find_by_tags(&self, tags: &[String], match_all: bool) -> BTreeSet<String> {
        let sets: Vec<BTreeSet<String>> = tags.iter().map(|t| self.find_by_tag(t)).collect();
        let Some(first) = sets.first() else { return BTreeSet::new() };
        if match_all {
            sets.iter().skip(1).fold(first.clone(), |acc, s| acc.intersection(s).cloned().collect())
        } else {
            sets.iter().skip(1).fold(first.clone(), |acc, s| acc.union(s).cloned().collect())
        }
    }

    /// Every known tag with its entry count (§4.I "get-all-tags").
    pub fn all_tags(&self) -> BTreeMap<String, usize> {
        self.map.iter().map(|(tag, keys)| (tag.clone(), keys.len())).collect()
    }

    pub fn tag_count(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn diff_update_adds_and_removes() {
        let mut index = TagIndex::new();
        index.diff_update("a", &set(&[]), &set(&["math"]));
        assert_eq!(index.find_by_tag("math"), set(&["a"]));
        index.diff_update("a", &set(&["math"]), &set(&["physics"]));
        assert!(index.find_by_tag("math").is_empty());
        assert_eq!(index.find_by_tag("physics"), set(&["a"]));
    }

    #[test]
    fn find_by_tags_union_and_intersection() {
        let mut index = TagIndex::new();
        index.diff_update("a", &set(&[]), &set(&["math", "physics"]));
        index.diff_update("b", &set(&[]), &set(&["physics"]));
        let union = index.find_by_tags(&["math".into(), "physics".into()], false);
        assert_eq!(union, set(&["a", "b"]));
        let intersection = index.find_by_tags(&["math".into(), "physics".into()], true);
        assert_eq!(intersection, set(&["a"]));
    }

    #[test]
    fn rebuild_replaces_prior_state() {
        let mut index = TagIndex::new();
        index.diff_update("stale", &set(&[]), &set(&["old"]));
        let fresh: BTreeSet<String> = set(&["new"]);
        let records = vec![("a".to_string(), fresh)];
        let records: Vec<(&str, &BTreeSet<String>)> = records.iter().map(|(k, v)| (k.as_str(), v)).collect();
        index.rebuild(records.into_iter());
        assert!(index.find_by_tag("old").is_empty());
        assert_eq!(index.find_by_tag("new"), set(&["a"]));
    }
}
