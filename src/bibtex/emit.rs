//! # BibTeX emission (§8 round-trip property, §6 `to_bibtex`)
//! Re-serializes [`Entry`] values back to BibTeX source text. Every field value is emitted as a
//! braced string by [`to_bibtex`]; this is deliberately the simplest representation the grammar
//! allows, rather than reproducing whatever literal form (quoted, macro reference,
//! concatenation) the source document used. [`to_bibtex_preserving`] covers the other case: an
//! entry re-emitted unchanged from a format-preservation-mode parse comes back byte-identical
//! to what was originally read, by re-using the captured raw source text instead of
//! re-rendering it (§4.B "format preservation mode").
use std::collections::HashMap;

use crate::bibtex::parser::ParseOutcome;
use crate::entry::Entry;

/// Escape nothing: BibTeX braced values may contain any character except an unbalanced brace.
/// Braces that occur in field values (rare, but legal in titles with nested emphasis groups)
/// are passed through as-is and are expected to already be balanced.
fn emit_field(buf: &mut String, name: &str, value: &str) {
    buf.push_str("  ");
    buf.push_str(name);
    buf.push_str(" = {");
    buf.push_str(value);
    buf.push_str("},\n");
}

/// Serialize a single entry as one `@type{key, field = {value}, ...}` block.
pub fn to_bibtex(entry: &Entry) -> String {
    let mut buf = String::new();
    buf.push('@');
    buf.push_str(entry.entry_type.as_str());
    buf.push('{');
    buf.push_str(entry.key.as_str());
    buf.push_str(",\n");
    for (name, value) in entry.fields.iter() {
        emit_field(&mut buf, name, &value);
    }
    if buf.ends_with(",\n") {
        buf.truncate(buf.len() - 2);
        buf.push('\n');
    }
    buf.push_str("}\n");
    buf
}

/// Serialize a sequence of entries, separated by a blank line, in the order given.
pub fn to_bibtex_many<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> String {
    let mut buf = String::new();
    for entry in entries {
        if !buf.is_empty() {
            buf.push('\n');
        }
        buf.push_str(&to_bibtex(entry));
    }
    buf
}

/// Serialize `entries`, preferring a byte-identical reproduction of each entry's original
/// source text wherever `original` (a [`crate::bibtex::parser::parse_str_preserving`] result
/// covering the same source) shows it unchanged since that parse, and falling back to
/// [`to_bibtex`]'s rendering for anything new, edited, or retyped (§4.B, §8 "unchanged bytes
/// re-emit byte-identically").
pub fn to_bibtex_preserving<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    original: &ParseOutcome,
) -> String {
    let raw_by_key: HashMap<&str, &str> = original
        .entries
        .iter()
        .zip(original.raw_records.iter())
        .map(|(keyed, raw)| (keyed.key.as_str(), raw.as_str()))
        .collect();

    let mut buf = String::new();
    for entry in entries {
        if !buf.is_empty() {
            buf.push('\n');
        }
        let matches_original = original
            .entries
            .iter()
            .find(|keyed| keyed.key == entry.key.as_str())
            .is_some_and(|keyed| {
                keyed.entry_type.eq_ignore_ascii_case(entry.entry_type.as_str()) && keyed.fields == entry.fields
            });

        if matches_original {
            if let Some(raw) = raw_by_key.get(entry.key.as_str()) {
                buf.push_str(raw);
                if !raw.ends_with('\n') {
                    buf.push('\n');
                }
                continue;
            }
        }
        buf.push_str(&to_bibtex(entry));
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bibtex::parser::{parse_str, parse_str_preserving};
    use crate::entry::{EntryKey, EntryType, Fields};

    fn smith_entry() -> Entry {
        let mut fields = Fields::default();
        fields.set("author", "Smith, John");
        fields.set("title", "A Study of Things");
        fields.set("journal", "Journal of Studies");
        fields.set("year", "2024");
        fields.set("doi", "10.1000/xyz123");
        Entry::new(EntryKey::new("smith2024").unwrap(), EntryType::Article, fields)
    }

    #[test]
    fn emits_a_parseable_entry() {
        let entry = smith_entry();
        let text = to_bibtex(&entry);
        assert!(text.starts_with("@article{smith2024,\n"));
        assert!(text.ends_with("}\n"));
        assert!(!text.contains(",\n}"), "trailing comma before closing brace: {text}");
    }

    #[test]
    fn round_trips_through_the_parser() {
        let entry = smith_entry();
        let text = to_bibtex(&entry);
        let outcome = parse_str(&text);
        assert!(!outcome.has_errors(), "{:?}", outcome.errors);
        assert_eq!(outcome.entries.len(), 1);
        let parsed = &outcome.entries[0];
        assert_eq!(parsed.key, "smith2024");
        assert_eq!(parsed.entry_type, "article");
        assert_eq!(parsed.fields.title.as_deref(), Some("A Study of Things"));
        assert_eq!(parsed.fields.doi.as_deref(), Some("10.1000/xyz123"));
        assert_eq!(parsed.fields.year, Some(2024));
    }

    #[test]
    fn many_entries_are_separated_by_a_blank_line() {
        let a = smith_entry();
        let b = a.with_key(EntryKey::new("smith2024b").unwrap());
        let text = to_bibtex_many([&a, &b]);
        assert_eq!(text.matches("@article").count(), 2);
        assert!(text.contains("}\n\n@article"));
    }

    #[test]
    fn preserving_mode_re_emits_unchanged_entries_byte_identically() {
        let src = "@article{smith2024,\n  title   = {Quantum},\n  year = 2024\n}\n";
        let original = parse_str_preserving(src);
        assert_eq!(original.raw_records.len(), 1);
        let entry = original.entries[0].clone().into_entry().unwrap();

        let text = to_bibtex_preserving([&entry], &original);
        assert_eq!(text, src);
    }

    #[test]
    fn preserving_mode_falls_back_to_rendering_for_edited_entries() {
        let src = "@article{smith2024,\n  title = {Quantum},\n  year = 2024\n}\n";
        let original = parse_str_preserving(src);
        let entry = original.entries[0].clone().into_entry().unwrap().with_field("title", "Revised");

        let text = to_bibtex_preserving([&entry], &original);
        assert_ne!(text, src);
        assert!(text.contains("Revised"));
    }
}
