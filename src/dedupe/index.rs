//! Inverted index over DOI, normalized title, and citation key, for duplicate detection
//! without an O(n²) pairwise scan over large collections (§4.E).
use std::collections::HashMap;

use crate::entry::Entry;

use super::normalize::{normalize_doi, normalize_title};

#[derive(Debug, Default)]
pub struct DuplicateIndex {
    by_doi: HashMap<String, Vec<String>>,
    by_title: HashMap<String, Vec<String>>,
    by_key: HashMap<String, usize>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn build(&mut self, entries: &[Entry]) {
        self.clear();
        for (i, entry) in entries.iter().enumerate() {
            self.add(entry, i);
        }
    }

    pub fn clear(&mut self) {
        self.by_doi.clear();
        self.by_title.clear();
        self.by_key.clear();
    }

    pub fn add(&mut self, entry: &Entry, position: usize) {
        self.by_key.insert(entry.key.as_str().to_owned(), position);
        if let Some(doi) = &entry.fields.doi {
            self.by_doi.entry(normalize_doi(doi)).or_default().push(entry.key.as_str().to_owned());
        }
        if let Some(title) = &entry.fields.title {
            self.by_title
                .entry(normalize_title(title))
                .or_default()
                .push(entry.key.as_str().to_owned());
        }
    }

    pub fn find_by_doi(&self, doi: &str) -> &[String] {
        self.by_doi.get(&normalize_doi(doi)).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_by_title(&self, title: &str) -> &[String] {
        self.by_title.get(&normalize_title(title)).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};

    fn entry(key: &str, title: &str, doi: &str) -> Entry {
        let mut fields = Fields::default();
        fields.set("title", title);
        fields.set("doi", doi);
        Entry::new(EntryKey::new(key).unwrap(), EntryType::Article, fields)
    }

    #[test]
    fn finds_entries_sharing_a_doi_regardless_of_prefix() {
        let mut index = DuplicateIndex::new();
        let entries = vec![
            entry("a", "Title A", "https://doi.org/10.1/xyz"),
            entry("b", "Title B", "10.1/xyz"),
        ];
        index.build(&entries);
        let matches = index.find_by_doi("doi:10.1/XYZ");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn finds_entries_sharing_a_normalized_title() {
        let mut index = DuplicateIndex::new();
        let entries = vec![
            entry("a", "A Study of Widgets!", "10.1/a"),
            entry("b", "a study of widgets", "10.1/b"),
        ];
        index.build(&entries);
        let matches = index.find_by_title("A Study Of Widgets");
        assert_eq!(matches.len(), 2);
    }
}
