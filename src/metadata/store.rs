//! The metadata store (§4.I): per-entry tags/notes/ratings sidecar persistence plus the
//! tag-to-entries inverted index.
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use uuid::Uuid;

use crate::entry::{EntryMetadata, Note};
use crate::error::StorageError;
use crate::storage::{atomic_write, sanitize_filename};

use super::index::TagIndex;

/// Per-entry metadata (tags, rating, read status, notes) backed by two directories under
/// `root`: `metadata/<sanitized-key>.json` holds one [`EntryMetadata`] record per entry, and
/// `notes/<sanitized-key>/<uuid>.json` holds its attached [`Note`]s. An in-memory [`TagIndex`]
/// is rebuilt by scanning `metadata/` on [`MetadataStore::open`] and diff-updated thereafter.
pub struct MetadataStore {
    root: PathBuf,
    index: RwLock<TagIndex>,
}

impl MetadataStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(root.join("metadata")).map_err(StorageError::Io)?;
        std::fs::create_dir_all(root.join("notes")).map_err(StorageError::Io)?;

        let store = Self { root, index: RwLock::new(TagIndex::new()) };
        store.rebuild_index()?;
        Ok(store)
    }

    fn rebuild_index(&self) -> Result<(), StorageError> {
        let mut records = Vec::new();
        for entry in std::fs::read_dir(self.root.join("metadata")).map_err(StorageError::Io)? {
            let entry = entry.map_err(StorageError::Io)?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = std::fs::read(&path).map_err(StorageError::Io)?;
            let Ok(metadata) = serde_json::from_slice::<EntryMetadata>(&bytes) else { continue };
            records.push(metadata);
        }
        let mut index = self.index.write().expect("tag index lock poisoned");
        let pairs: Vec<(&str, &std::collections::BTreeSet<String>)> =
            records.iter().map(|m| (m.entry_key.as_str(), &m.tags)).collect();
        index.rebuild(pairs.into_iter());
        Ok(())
    }

    fn metadata_path(&self, key: &str) -> PathBuf {
        self.root.join("metadata").join(format!("{}.json", sanitize_filename(key)))
    }

    fn notes_dir(&self, key: &str) -> PathBuf {
        self.root.join("notes").join(sanitize_filename(key))
    }

    fn note_path(&self, key: &str, id: Uuid) -> PathBuf {
        self.notes_dir(key).join(format!("{id}.json"))
    }

    fn read_metadata_file(&self, key: &str) -> Result<Option<EntryMetadata>, StorageError> {
        let path = self.metadata_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path).map_err(StorageError::Io)?;
        Ok(serde_json::from_slice(&bytes).ok())
    }

    /// The existing record for `key`, or a fresh unsaved [`EntryMetadata::default`] (§4.I
    /// "get-metadata returns an existing record or a freshly constructed default").
    pub fn get_metadata(&self, key: &str) -> Result<EntryMetadata, StorageError> {
        Ok(self.read_metadata_file(key)?.unwrap_or_else(|| EntryMetadata::new(key)))
    }

    /// Persist `metadata`, diff-updating the tag index against whatever was previously on
    /// disk for this key (§4.I).
    pub fn save_metadata(&self, metadata: &EntryMetadata) -> Result<(), StorageError> {
        let previous_tags = self.read_metadata_file(&metadata.entry_key)?.map(|m| m.tags).unwrap_or_default();

        let data = serde_json::to_vec_pretty(metadata)?;
        atomic_write(&self.metadata_path(&metadata.entry_key), &data)?;

        let mut index = self.index.write().expect("tag index lock poisoned");
        index.diff_update(&metadata.entry_key, &previous_tags, &metadata.tags);
        Ok(())
    }

    /// Remove `key`'s metadata record, if any, pruning it from the tag index too.
    pub fn delete_metadata(&self, key: &str) -> Result<bool, StorageError> {
        let Some(existing) = self.read_metadata_file(key)? else { return Ok(false) };
        let path = self.metadata_path(key);
        std::fs::remove_file(&path).map_err(StorageError::Io)?;
        let mut index = self.index.write().expect("tag index lock poisoned");
        index.diff_update(key, &existing.tags, &Default::default());
        Ok(true)
    }

    fn bump_notes_count(&self, key: &str, delta: i64) -> Result<(), StorageError> {
        let mut metadata = self.get_metadata(key)?;
        metadata.notes_count = metadata.notes_count.saturating_add_signed(delta as isize);
        self.save_metadata(&metadata)
    }

    pub fn add_note(&self, note: &Note) -> Result<(), StorageError> {
        std::fs::create_dir_all(self.notes_dir(&note.entry_key)).map_err(StorageError::Io)?;
        let data = serde_json::to_vec_pretty(note)?;
        atomic_write(&self.note_path(&note.entry_key, note.id), &data)?;
        self.bump_notes_count(&note.entry_key, 1)
    }

    pub fn get_note(&self, key: &str, id: Uuid) -> Result<Option<Note>, StorageError> {
        let path = self.note_path(key, id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path).map_err(StorageError::Io)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn list_notes(&self, key: &str) -> Result<Vec<Note>, StorageError> {
        let dir = self.notes_dir(key);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut notes = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(StorageError::Io)? {
            let path = entry.map_err(StorageError::Io)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = std::fs::read(&path).map_err(StorageError::Io)?;
            if let Ok(note) = serde_json::from_slice(&bytes) {
                notes.push(note);
            }
        }
        notes.sort_by_key(|n: &Note| n.created_at);
        Ok(notes)
    }

    pub fn delete_note(&self, key: &str, id: Uuid) -> Result<bool, StorageError> {
        let path = self.note_path(key, id);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path).map_err(StorageError::Io)?;
        self.bump_notes_count(key, -1)?;
        Ok(true)
    }

    pub fn find_by_tag(&self, tag: &str) -> std::collections::BTreeSet<String> {
        self.index.read().expect("tag index lock poisoned").find_by_tag(tag)
    }

    pub fn find_by_tags(&self, tags: &[String], match_all: bool) -> std::collections::BTreeSet<String> {
        self.index.read().expect("tag index lock poisoned").find_by_tags(tags, match_all)
    }

    pub fn get_all_tags(&self) -> BTreeMap<String, usize> {
        self.index.read().expect("tag index lock poisoned").all_tags()
    }

    /// Rewrite `old` to `new` on every entry carrying it, returning the affected count
    /// (§4.I "rename-tag").
    pub fn rename_tag(&self, old: &str, new: &str) -> Result<usize, StorageError> {
        let keys = self.find_by_tag(old);
        for key in &keys {
            let mut metadata = self.get_metadata(key)?;
            metadata.tags.remove(old);
            metadata.tags.insert(new.to_owned());
            self.save_metadata(&metadata)?;
        }
        Ok(keys.len())
    }

    /// Fold every tag in `sources` into `target` across all entries that carry any of them
    /// (§4.I "merge-tags").
    pub fn merge_tags(&self, sources: &[String], target: &str) -> Result<usize, StorageError> {
        let keys = self.find_by_tags(sources, false);
        for key in &keys {
            let mut metadata = self.get_metadata(key)?;
            for source in sources {
                metadata.tags.remove(source);
            }
            metadata.tags.insert(target.to_owned());
            self.save_metadata(&metadata)?;
        }
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NoteType;
    use tempfile::tempdir;

    #[test]
    fn save_and_get_metadata_round_trips() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::open(dir.path()).unwrap();
        let mut metadata = store.get_metadata("smith2024").unwrap();
        metadata.tags.insert("math".to_owned());
        metadata.set_rating(Some(5));
        store.save_metadata(&metadata).unwrap();

        let reloaded = store.get_metadata("smith2024").unwrap();
        assert_eq!(reloaded.rating, Some(5));
        assert!(reloaded.tags.contains("math"));
        assert_eq!(store.find_by_tag("math"), [String::from("smith2024")].into_iter().collect());
    }

    #[test]
    fn notes_round_trip_and_count() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::open(dir.path()).unwrap();
        let note = Note::new("smith2024", "key idea", NoteType::Idea);
        store.add_note(&note).unwrap();
        assert_eq!(store.get_metadata("smith2024").unwrap().notes_count, 1);
        assert_eq!(store.list_notes("smith2024").unwrap().len(), 1);
        assert!(store.delete_note("smith2024", note.id).unwrap());
        assert_eq!(store.get_metadata("smith2024").unwrap().notes_count, 0);
    }

    #[test]
    fn rename_and_merge_tags() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::open(dir.path()).unwrap();
        let mut a = store.get_metadata("a").unwrap();
        a.tags.insert("physics".to_owned());
        store.save_metadata(&a).unwrap();
        let mut b = store.get_metadata("b").unwrap();
        b.tags.insert("chemistry".to_owned());
        store.save_metadata(&b).unwrap();

        assert_eq!(store.rename_tag("physics", "science").unwrap(), 1);
        assert!(store.find_by_tag("physics").is_empty());
        assert!(store.get_metadata("a").unwrap().tags.contains("science"));

        assert_eq!(store.merge_tags(&["science".to_owned(), "chemistry".to_owned()], "stem").unwrap(), 2);
        assert!(store.get_metadata("a").unwrap().tags.contains("stem"));
        assert!(store.get_metadata("b").unwrap().tags.contains("stem"));
    }

    #[test]
    fn index_rebuilds_on_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = MetadataStore::open(dir.path()).unwrap();
            let mut metadata = store.get_metadata("a").unwrap();
            metadata.tags.insert("math".to_owned());
            store.save_metadata(&metadata).unwrap();
        }
        let store = MetadataStore::open(dir.path()).unwrap();
        assert_eq!(store.find_by_tag("math"), [String::from("a")].into_iter().collect());
    }
}
