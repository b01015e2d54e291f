//! # Entity model (§4.A)
//! Immutable records for bibliographic entries, collections, tags, notes, and metadata. Every
//! "mutation" on [`Entry`] and [`crate::entry::collection::Collection`] returns a new instance;
//! the repository (§4.H) and metadata store (§4.I) are the sole persistent owners.
mod collection;
mod duplicate;
mod fields;
mod key;
mod metadata;
mod note;
mod tag;
mod validation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use self::{
    collection::{Collection, CollectionMembers},
    duplicate::{DuplicateMatch, MatchType},
    fields::{extract_year, split_author_list, split_keywords, EntryType, Fields, FIELD_NAMES},
    key::{EntryKey, InvalidKey},
    metadata::{EntryMetadata, Importance, ReadStatus},
    note::{Note, NoteType},
    tag::{InvalidTag, Tag},
    validation::{Severity, ValidationResult},
};

/// An immutable bibliographic entry (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub key: EntryKey,
    pub entry_type: EntryType,
    pub fields: Fields,
    pub file: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(key: EntryKey, entry_type: EntryType, fields: Fields) -> Self {
        let now = Utc::now();
        Self {
            key,
            entry_type,
            fields,
            file: None,
            created_at: now,
            modified_at: now,
        }
    }

    /// Return a new instance with `field` set to `value` and a refreshed `modified_at`.
    pub fn with_field(&self, field: &str, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.fields.set(field, value);
        next.modified_at = Utc::now();
        next
    }

    /// Return a new instance with `field` removed and a refreshed `modified_at`.
    pub fn without_field(&self, field: &str) -> Self {
        let mut next = self.clone();
        next.fields.unset(field);
        next.modified_at = Utc::now();
        next
    }

    /// Return a new instance under a different citation key, preserving all other data.
    pub fn with_key(&self, key: EntryKey) -> Self {
        let mut next = self.clone();
        next.key = key;
        next.modified_at = Utc::now();
        next
    }

    /// The parsed author list (§3/§4.E), splitting on ` and ` and respecting `\&` escapes.
    pub fn authors(&self) -> Vec<String> {
        self.fields.authors()
    }

    /// Text suitable for full-text search or duplicate detection: title, author, abstract,
    /// and keywords concatenated.
    pub fn search_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(t) = &self.fields.title {
            parts.push(t.as_str());
        }
        if let Some(a) = &self.fields.author {
            parts.push(a.as_str());
        }
        if let Some(a) = &self.fields.abstract_ {
            parts.push(a.as_str());
        }
        parts.join(" ")
    }

    /// The minimum required fields for this entry's type (§3, §4.D "Required-field rules").
    ///
    /// Disjunctive requirements (author OR editor; chapter OR pages) are represented as an
    /// inner slice of alternatives, any one of which satisfies the requirement.
    pub fn required_field_groups(entry_type: EntryType) -> &'static [&'static [&'static str]] {
        use EntryType::*;
        match entry_type {
            Article => &[&["author"], &["title"], &["journal"], &["year"]],
            Book => &[&["author", "editor"], &["title"], &["publisher"], &["year"]],
            Booklet => &[&["title"]],
            Conference | Inproceedings => {
                &[&["author"], &["title"], &["booktitle"], &["year"]]
            }
            Inbook => &[
                &["author", "editor"],
                &["title"],
                &["chapter", "pages"],
                &["publisher"],
                &["year"],
            ],
            Incollection => &[
                &["author"],
                &["title"],
                &["booktitle"],
                &["publisher"],
                &["year"],
            ],
            Manual => &[&["title"]],
            Mastersthesis | Phdthesis => &[&["author"], &["title"], &["school"], &["year"]],
            Misc => &[],
            Proceedings => &[&["title"], &["year"]],
            Techreport => &[&["author"], &["title"], &["institution"], &["year"]],
            Unpublished => &[&["author"], &["title"], &["note"]],
        }
    }

    /// Whether every required-field group is satisfied (at least one alternative present).
    pub fn has_required_fields(&self) -> bool {
        Self::required_field_groups(self.entry_type)
            .iter()
            .all(|group| group.iter().any(|f| self.fields.get(f).is_some()))
    }
}

/// A citation key paired with freshly parsed data, used by the BibTeX parser and streaming
/// reader before timestamps and full validation are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedEntry {
    pub key: String,
    pub entry_type: String,
    pub fields: Fields,
}

impl KeyedEntry {
    /// Promote a freshly parsed record into a timestamped [`Entry`], coercing an unrecognized
    /// entry type to [`EntryType::Misc`] the same way load-side migration does
    /// (`crate::repository::migrate`).
    pub fn into_entry(self) -> Result<Entry, InvalidKey> {
        let key = EntryKey::new(self.key)?;
        let entry_type = self.entry_type.parse().unwrap_or(EntryType::Misc);
        Ok(Entry::new(key, entry_type, self.fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(entry_type: EntryType, fields: Fields) -> Entry {
        Entry::new(EntryKey::new("smith2024").unwrap(), entry_type, fields)
    }

    #[test]
    fn article_requires_author_title_journal_year() {
        let mut fields = Fields::default();
        fields.set("title", "Quantum");
        let e = entry(EntryType::Article, fields);
        assert!(!e.has_required_fields());

        let mut fields = Fields::default();
        fields.set("author", "Smith, J.");
        fields.set("title", "Quantum");
        fields.set("journal", "Nature");
        fields.set("year", "2024");
        let e = entry(EntryType::Article, fields);
        assert!(e.has_required_fields());
    }

    #[test]
    fn book_accepts_author_or_editor() {
        let mut fields = Fields::default();
        fields.set("editor", "Smith, J.");
        fields.set("title", "Quantum");
        fields.set("publisher", "Acme");
        fields.set("year", "2024");
        let e = entry(EntryType::Book, fields);
        assert!(e.has_required_fields());
    }

    #[test]
    fn with_field_preserves_other_fields_and_bumps_modified_at() {
        let mut fields = Fields::default();
        fields.set("title", "Quantum");
        let e = entry(EntryType::Misc, fields);
        let e2 = e.with_field("author", "Smith, J.");
        assert_eq!(e2.fields.title.as_deref(), Some("Quantum"));
        assert_eq!(e2.fields.author.as_deref(), Some("Smith, J."));
        assert!(e2.modified_at >= e.modified_at);
    }
}
