//! Citation key generation from a compiled pattern (§4.F).
use crate::entry::Entry;

use super::pattern::{KeyPattern, Segment};
use super::sanitize::sanitize;
use super::tokens::{extract_author, extract_authors, extract_journal, extract_title, extract_word, extract_year};

/// Render `pattern` against `entry` into a sanitized citation key. Does not check for
/// collisions; see [`super::resolve`] for collision handling.
pub fn generate_key(pattern: &KeyPattern, entry: &Entry) -> String {
    let mut raw = String::new();
    let mut components: Vec<String> = Vec::new();

    for segment in &pattern.segments {
        match segment {
            Segment::Literal(text) => raw.push_str(text),
            Segment::Token { name, param } => {
                let value = match name.as_str() {
                    "author" => extract_author(entry, *param, pattern.max_author_chars),
                    "authors" => extract_authors(entry, *param),
                    "year" => extract_year(entry, *param),
                    "title" => extract_title(entry, *param, pattern.min_title_chars),
                    "word" => extract_word(entry, *param, pattern.min_title_chars),
                    "journal" => extract_journal(entry, *param),
                    _ => String::new(),
                };
                components.push(value.clone());
                raw.push_str(&value);
            }
        }
    }

    let cased = if pattern.separator.is_empty() && matches!(pattern.case, super::case::Case::Lower) {
        raw
    } else {
        pattern.case.apply(&components, &pattern.separator)
    };

    sanitize(&cased, pattern.min_length, pattern.max_length)
}
