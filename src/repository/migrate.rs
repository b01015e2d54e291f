//! Load-side schema migration and the JSON interchange loader (§4.H, §6).
//!
//! Grounded in the original's `storage/migrations.py`: a raw, loosely-typed record (as it
//! might appear in an older on-disk schema, or in the JSON interchange format of §6) is
//! coerced into the current [`Entry`] shape: `type` string -> [`EntryType`] (unknown values
//! fall back to `misc`, matching the BibTeX parser's own coercion rule in §4.B), `year`
//! string/number -> integer, and a comma/semicolon-separated `keywords` string -> a sequence.
use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::entry::{Entry, EntryKey, EntryType, Fields, FIELD_NAMES};
use crate::error::StorageError;

/// Coerce a raw `type` string and a raw field map into a typed [`EntryType`] and [`Fields`]
/// (§4.H "load-side applies schema migration").
pub fn migrate_raw_fields(raw_type: Option<&str>, raw_fields: &BTreeMap<String, Value>) -> (EntryType, Fields) {
    let entry_type = raw_type.map(|t| t.parse::<EntryType>().unwrap_or(EntryType::Misc)).unwrap_or(EntryType::Misc);

    let mut fields = Fields::default();
    for name in FIELD_NAMES {
        let Some(value) = raw_fields.get(*name) else { continue };
        let as_string = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect::<Vec<_>>()
                .join(", "),
            _ => continue,
        };
        fields.set(name, as_string);
    }
    (entry_type, fields)
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    key: String,
    #[serde(rename = "type")]
    entry_type: Option<String>,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawInterchange {
    Wrapped { entries: Vec<RawRecord> },
    Bare(Vec<RawRecord>),
}

/// Parse the JSON interchange shape from §6: `{"version": "1.0", "entries": [...]}` or a bare
/// array. Every object must have `key`; a missing `type` defaults to `misc`.
pub fn parse_json_interchange(bytes: &[u8]) -> Result<Vec<Entry>, StorageError> {
    let raw: RawInterchange = serde_json::from_slice(bytes)?;
    let records = match raw {
        RawInterchange::Wrapped { entries } => entries,
        RawInterchange::Bare(entries) => entries,
    };

    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let key = EntryKey::new(record.key)
            .map_err(|err| StorageError::Other(format!("invalid citation key in JSON interchange: {err}")))?;
        let (entry_type, fields) = migrate_raw_fields(record.entry_type.as_deref(), &record.fields);
        entries.push(Entry::new(key, entry_type, fields));
    }
    Ok(entries)
}
