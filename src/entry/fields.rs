use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of BibTeX entry categories recognized by the system (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Article,
    Book,
    Booklet,
    Conference,
    Inbook,
    Incollection,
    Inproceedings,
    Manual,
    Mastersthesis,
    Misc,
    Phdthesis,
    Proceedings,
    Techreport,
    Unpublished,
}

impl EntryType {
    pub const ALL: [Self; 14] = [
        Self::Article,
        Self::Book,
        Self::Booklet,
        Self::Conference,
        Self::Inbook,
        Self::Incollection,
        Self::Inproceedings,
        Self::Manual,
        Self::Mastersthesis,
        Self::Misc,
        Self::Phdthesis,
        Self::Proceedings,
        Self::Techreport,
        Self::Unpublished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::Booklet => "booklet",
            Self::Conference => "conference",
            Self::Inbook => "inbook",
            Self::Incollection => "incollection",
            Self::Inproceedings => "inproceedings",
            Self::Manual => "manual",
            Self::Mastersthesis => "mastersthesis",
            Self::Misc => "misc",
            Self::Phdthesis => "phdthesis",
            Self::Proceedings => "proceedings",
            Self::Techreport => "techreport",
            Self::Unpublished => "unpublished",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown entry types coerce to `misc` with a warning (§4.B); [`FromStr`] never fails for
/// this reason — callers who need to detect the coercion should compare the lowercased input
/// against `"misc"` themselves before parsing.
impl FromStr for EntryType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "booklet" => Self::Booklet,
            "conference" => Self::Conference,
            "inbook" => Self::Inbook,
            "incollection" => Self::Incollection,
            "inproceedings" => Self::Inproceedings,
            "manual" => Self::Manual,
            "mastersthesis" => Self::Mastersthesis,
            "phdthesis" => Self::Phdthesis,
            "proceedings" => Self::Proceedings,
            "techreport" => Self::Techreport,
            "unpublished" => Self::Unpublished,
            _ => Self::Misc,
        })
    }
}

/// The BibTeX field vocabulary (§3: standard and extended fields), plus `year` stored as an
/// integer and `keywords` stored pre-split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fields {
    // standard
    pub author: Option<String>,
    pub editor: Option<String>,
    pub title: Option<String>,
    pub journal: Option<String>,
    pub booktitle: Option<String>,
    pub publisher: Option<String>,
    pub school: Option<String>,
    pub institution: Option<String>,
    pub year: Option<i32>,
    pub month: Option<String>,
    pub volume: Option<String>,
    pub number: Option<String>,
    pub pages: Option<String>,
    pub series: Option<String>,
    pub edition: Option<String>,
    pub chapter: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub howpublished: Option<String>,
    pub organization: Option<String>,
    pub crossref: Option<String>,
    pub annote: Option<String>,
    // extended
    pub abstract_: Option<String>,
    pub doi: Option<String>,
    pub eprint: Option<String>,
    pub isbn: Option<String>,
    pub issn: Option<String>,
    pub keywords: Vec<String>,
    pub language: Option<String>,
    pub location: Option<String>,
    pub pmid: Option<String>,
    pub url: Option<String>,
}

/// The full list of recognized field names, in the order they are emitted (§4.B/§6).
pub const FIELD_NAMES: &[&str] = &[
    "author",
    "editor",
    "title",
    "journal",
    "booktitle",
    "publisher",
    "school",
    "institution",
    "year",
    "month",
    "volume",
    "number",
    "pages",
    "series",
    "edition",
    "chapter",
    "address",
    "note",
    "howpublished",
    "organization",
    "crossref",
    "annote",
    "abstract",
    "doi",
    "eprint",
    "isbn",
    "issn",
    "keywords",
    "language",
    "location",
    "pmid",
    "url",
];

/// Split a keywords field on either commas or semicolons (§3 invariant), trimming and
/// dropping empty segments.
pub fn split_keywords(raw: &str) -> Vec<String> {
    let sep = if raw.contains(';') { ';' } else { ',' };
    raw.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Extract the first run of 4 consecutive ASCII digits from a string, for converting a raw
/// `year` field value to an integer (§4.B).
pub fn extract_year(raw: &str) -> Option<i32> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            let mut j = i;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j - start >= 4 {
                return raw[start..start + 4].parse().ok();
            }
            i = j;
        } else {
            i += 1;
        }
    }
    None
}

impl Fields {
    /// Get a field's value by its lowercase BibTeX name, as an owned string. `year` is
    /// formatted back to decimal; `keywords` is rejoined with `", "`.
    pub fn get(&self, name: &str) -> Option<String> {
        match name {
            "author" => self.author.clone(),
            "editor" => self.editor.clone(),
            "title" => self.title.clone(),
            "journal" => self.journal.clone(),
            "booktitle" => self.booktitle.clone(),
            "publisher" => self.publisher.clone(),
            "school" => self.school.clone(),
            "institution" => self.institution.clone(),
            "year" => self.year.map(|y| y.to_string()),
            "month" => self.month.clone(),
            "volume" => self.volume.clone(),
            "number" => self.number.clone(),
            "pages" => self.pages.clone(),
            "series" => self.series.clone(),
            "edition" => self.edition.clone(),
            "chapter" => self.chapter.clone(),
            "address" => self.address.clone(),
            "note" => self.note.clone(),
            "howpublished" => self.howpublished.clone(),
            "organization" => self.organization.clone(),
            "crossref" => self.crossref.clone(),
            "annote" => self.annote.clone(),
            "abstract" => self.abstract_.clone(),
            "doi" => self.doi.clone(),
            "eprint" => self.eprint.clone(),
            "isbn" => self.isbn.clone(),
            "issn" => self.issn.clone(),
            "keywords" if !self.keywords.is_empty() => Some(self.keywords.join(", ")),
            "language" => self.language.clone(),
            "location" => self.location.clone(),
            "pmid" => self.pmid.clone(),
            "url" => self.url.clone(),
            _ => None,
        }
    }

    /// Set a field by its lowercase BibTeX name. Unknown field names are ignored: BibTeX
    /// permits arbitrary custom fields, but this catalog only tracks the ones §3 names.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match name {
            "author" => self.author = Some(value),
            "editor" => self.editor = Some(value),
            "title" => self.title = Some(value),
            "journal" => self.journal = Some(value),
            "booktitle" => self.booktitle = Some(value),
            "publisher" => self.publisher = Some(value),
            "school" => self.school = Some(value),
            "institution" => self.institution = Some(value),
            "year" => self.year = extract_year(&value),
            "month" => self.month = Some(value),
            "volume" => self.volume = Some(value),
            "number" => self.number = Some(value),
            "pages" => self.pages = Some(value),
            "series" => self.series = Some(value),
            "edition" => self.edition = Some(value),
            "chapter" => self.chapter = Some(value),
            "address" => self.address = Some(value),
            "note" => self.note = Some(value),
            "howpublished" => self.howpublished = Some(value),
            "organization" => self.organization = Some(value),
            "crossref" => self.crossref = Some(value),
            "annote" => self.annote = Some(value),
            "abstract" => self.abstract_ = Some(value),
            "doi" => self.doi = Some(value),
            "eprint" => self.eprint = Some(value),
            "isbn" => self.isbn = Some(value),
            "issn" => self.issn = Some(value),
            "keywords" => self.keywords = split_keywords(&value),
            "language" => self.language = Some(value),
            "location" => self.location = Some(value),
            "pmid" => self.pmid = Some(value),
            "url" => self.url = Some(value),
            _ => {}
        }
    }

    /// Clear a field by name.
    pub fn unset(&mut self, name: &str) {
        match name {
            "author" => self.author = None,
            "editor" => self.editor = None,
            "title" => self.title = None,
            "journal" => self.journal = None,
            "booktitle" => self.booktitle = None,
            "publisher" => self.publisher = None,
            "school" => self.school = None,
            "institution" => self.institution = None,
            "year" => self.year = None,
            "month" => self.month = None,
            "volume" => self.volume = None,
            "number" => self.number = None,
            "pages" => self.pages = None,
            "series" => self.series = None,
            "edition" => self.edition = None,
            "chapter" => self.chapter = None,
            "address" => self.address = None,
            "note" => self.note = None,
            "howpublished" => self.howpublished = None,
            "organization" => self.organization = None,
            "crossref" => self.crossref = None,
            "annote" => self.annote = None,
            "abstract" => self.abstract_ = None,
            "doi" => self.doi = None,
            "eprint" => self.eprint = None,
            "isbn" => self.isbn = None,
            "issn" => self.issn = None,
            "keywords" => self.keywords.clear(),
            "language" => self.language = None,
            "location" => self.location = None,
            "pmid" => self.pmid = None,
            "url" => self.url = None,
            _ => {}
        }
    }

    /// Iterate over every field that is currently set, in [`FIELD_NAMES`] order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
        FIELD_NAMES.iter().filter_map(|name| self.get(name).map(|v| (*name, v)))
    }

    /// The author list: split on ` and `, preserving `\&`-escaped ampersands (§4.E/§3).
    pub fn authors(&self) -> Vec<String> {
        split_author_list(self.author.as_deref().unwrap_or(""))
    }
}

/// Split an `author`/`editor` field on ` and `, without splitting on an escaped `\&`.
pub fn split_author_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut current = String::new();
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if raw[i..].starts_with("\\&") {
            current.push_str("\\&");
            i += 2;
            continue;
        }
        if raw[i..].starts_with(" and ") {
            parts.push(std::mem::take(&mut current));
            i += 5;
            continue;
        }
        let ch = raw[i..].chars().next().unwrap();
        current.push(ch);
        i += ch.len_utf8();
    }
    parts.push(current);
    parts
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_extraction() {
        assert_eq!(extract_year("2024"), Some(2024));
        assert_eq!(extract_year("c. 2024"), Some(2024));
        assert_eq!(extract_year("12345"), Some(1234));
        assert_eq!(extract_year("no year here"), None);
    }

    #[test]
    fn keywords_split_on_comma_or_semicolon() {
        assert_eq!(split_keywords("a, b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_keywords("a; b; c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn author_split_respects_escaped_ampersand() {
        let names = split_author_list("Smith \\& Sons and Doe, Jane");
        assert_eq!(names, vec!["Smith \\& Sons", "Doe, Jane"]);
    }

    #[test]
    fn field_roundtrip() {
        let mut f = Fields::default();
        f.set("year", "2024");
        f.set("title", "Quantum");
        assert_eq!(f.year, Some(2024));
        assert_eq!(f.get("title").as_deref(), Some("Quantum"));
        f.unset("title");
        assert!(f.get("title").is_none());
    }
}
