use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reading status for an entry (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadStatus {
    #[default]
    Unread,
    Reading,
    Read,
    Skimmed,
}

/// Importance level for an entry (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

/// Sidecar record for an entry key (§3, §4.I). `get_metadata` on the metadata store returns
/// an existing record or a freshly constructed [`EntryMetadata::default`]; defaults are not
/// persisted until explicitly saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub entry_key: String,
    pub tags: BTreeSet<String>,
    pub rating: Option<u8>,
    pub read_status: ReadStatus,
    pub read_date: Option<DateTime<Utc>>,
    pub importance: Importance,
    pub notes_count: usize,
    pub collections: BTreeSet<String>,
    pub custom_fields: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl EntryMetadata {
    pub fn new(entry_key: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            entry_key: entry_key.into(),
            tags: BTreeSet::new(),
            rating: None,
            read_status: ReadStatus::default(),
            read_date: None,
            importance: Importance::default(),
            notes_count: 0,
            collections: BTreeSet::new(),
            custom_fields: BTreeMap::new(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Set the rating, clamping into `[1, 5]` (§3). Passing `None` clears it.
    pub fn set_rating(&mut self, rating: Option<u8>) {
        self.rating = rating.map(|r| r.clamp(1, 5));
        self.modified_at = Utc::now();
    }
}
