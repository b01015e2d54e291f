use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a [`Note`] (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    General,
    Summary,
    Quote,
    Idea,
    Critique,
}

/// A note attached to an entry by citation key (§3). Notes are identified by a UUID and
/// never own the entry they reference — the repository is the sole owner of entry data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub entry_key: String,
    pub content: String,
    pub note_type: NoteType,
    pub page: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Note {
    pub fn new(entry_key: impl Into<String>, content: impl Into<String>, note_type: NoteType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            entry_key: entry_key.into(),
            content: content.into(),
            note_type,
            page: None,
            tags: Vec::new(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Return a new note instance with updated content and a refreshed `modified_at`.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.content = content.into();
        next.modified_at = Utc::now();
        next
    }
}
