//! File-per-entry JSON backend (§4.G).
//!
//! Layout under `root`:
//! ```text
//! entries/<sanitized-key>.json
//! index.json
//! ```
//! `index.json` maps the logical citation key to the sanitized filename actually used on
//! disk, so a key containing characters unsafe for a filename still round-trips.
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::entry::Entry;
use crate::error::StorageError;
use crate::logger::{debug, warn};

use super::backend::Backend;

/// Keep alphanumerics, `-`, `_`; replace every other character with `_` (§4.G "Key
/// sanitization for filenames"). Reused by the metadata store (§4.I) for its own
/// per-key filenames.
pub(crate) fn sanitize_filename(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Serialize `entry` to sorted-key, 2-space-indented JSON (§6 "Persisted layout"). Routing
/// through [`serde_json::Value`] is what gives us sorted keys: `serde_json`'s `Map` is a
/// `BTreeMap` unless the `preserve_order` feature is enabled, which this crate does not use.
fn to_sorted_json(entry: &Entry) -> Result<Vec<u8>, StorageError> {
    let value = serde_json::to_value(entry)?;
    Ok(serde_json::to_vec_pretty(&value)?)
}

/// Write `data` to `path` atomically: write to a temp file in the same directory, fsync,
/// then rename over the destination (§4.G "Atomic writes"). A write that fails partway
/// leaves no file at `path` with partial content, since the temp file is never linked at the
/// destination name until the rename completes.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    let dir = path.parent().ok_or_else(|| StorageError::Other("path has no parent directory".into()))?;
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("entry");
    let tmp_path = dir.join(format!(".{file_name}.tmp"));

    let mut file = File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// The file-per-entry backend (§4.G).
///
/// Cooperative locking is modeled as documented in §5: the core is single-process, so the
/// "shared file-lock on read / exclusive on write" and "re-entrant per-thread index lock"
/// requirements are satisfied with an in-process [`RwLock`] guarding the index; readers and
/// writers never race within one process, and cross-process use is out of scope (§1
/// Non-goals).
pub struct FileBackend {
    root: PathBuf,
    index: RwLock<BTreeMap<String, String>>,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), index: RwLock::new(BTreeMap::new()) }
    }

    fn entries_dir(&self) -> PathBuf {
        self.root.join("entries")
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn load_index(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }

    fn save_index(&self, index: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(index)?;
        atomic_write(&self.index_path(), &bytes)
    }

    /// Copy the whole data tree to `backup_dir` (§4.G "Backup/restore").
    pub fn backup_to(&self, backup_dir: impl AsRef<Path>) -> Result<(), StorageError> {
        copy_dir_recursive(&self.root, backup_dir.as_ref())
    }

    /// Replace the data tree with `backup_dir`'s contents and reload the index (§4.G
    /// "Backup/restore").
    pub fn restore_from(&mut self, backup_dir: impl AsRef<Path>) -> Result<(), StorageError> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        copy_dir_recursive(backup_dir.as_ref(), &self.root)?;
        let index = self.load_index()?;
        *self.index.write().expect("index lock poisoned") = index;
        Ok(())
    }
}

fn copy_dir_recursive(from: &Path, to: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

impl Backend for FileBackend {
    fn initialize(&mut self) -> Result<(), StorageError> {
        fs::create_dir_all(self.entries_dir())?;
        let index = self.load_index()?;
        *self.index.write().expect("index lock poisoned") = index;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<Entry>, StorageError> {
        let filename = {
            let index = self.index.read().expect("index lock poisoned");
            match index.get(key) {
                Some(f) => f.clone(),
                None => return Ok(None),
            }
        };
        let path = self.entries_dir().join(&filename);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(_) => return Ok(None),
        };
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(err) => {
                warn!("corrupted entry file for key '{key}': {err}");
                Ok(None)
            }
        }
    }

    fn write(&mut self, key: &str, entry: &Entry) -> Result<(), StorageError> {
        let filename = format!("{}.json", sanitize_filename(key));
        let path = self.entries_dir().join(&filename);
        let data = to_sorted_json(entry)?;
        atomic_write(&path, &data)?;

        let mut index = self.index.write().expect("index lock poisoned");
        index.insert(key.to_owned(), filename);
        self.save_index(&index)?;
        debug!("wrote entry '{key}'");
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, StorageError> {
        let filename = {
            let mut index = self.index.write().expect("index lock poisoned");
            match index.remove(key) {
                Some(f) => f,
                None => return Ok(false),
            }
        };
        let path = self.entries_dir().join(&filename);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        let index = self.index.read().expect("index lock poisoned").clone();
        self.save_index(&index)?;
        Ok(true)
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.index.read().expect("index lock poisoned").contains_key(key))
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let index = self.index.read().expect("index lock poisoned");
        Ok(index
            .iter()
            .filter(|(_, filename)| self.entries_dir().join(filename).exists())
            .map(|(k, _)| k.clone())
            .collect())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        let keys: Vec<String> = self.index.read().expect("index lock poisoned").keys().cloned().collect();
        for key in keys {
            self.delete(&key)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};
    use tempfile::tempdir;

    fn entry(key: &str) -> Entry {
        let mut fields = Fields::default();
        fields.set("title", "Quantum");
        Entry::new(EntryKey::new(key).unwrap(), EntryType::Misc, fields)
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());
        backend.initialize().unwrap();
        let e = entry("smith2024");
        backend.write("smith2024", &e).unwrap();
        let read_back = backend.read("smith2024").unwrap().unwrap();
        assert_eq!(read_back.fields.title, e.fields.title);
    }

    #[test]
    fn delete_removes_entry_and_index_entry() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());
        backend.initialize().unwrap();
        backend.write("smith2024", &entry("smith2024")).unwrap();
        assert!(backend.delete("smith2024").unwrap());
        assert!(backend.read("smith2024").unwrap().is_none());
        assert!(!backend.exists("smith2024").unwrap());
    }

    #[test]
    fn keys_skips_unreadable_files() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());
        backend.initialize().unwrap();
        backend.write("smith2024", &entry("smith2024")).unwrap();
        fs::remove_file(backend.entries_dir().join("smith2024.json")).unwrap();
        assert!(backend.keys().unwrap().is_empty());
    }

    #[test]
    fn index_persists_across_reinitialize() {
        let dir = tempdir().unwrap();
        {
            let mut backend = FileBackend::new(dir.path());
            backend.initialize().unwrap();
            backend.write("smith2024", &entry("smith2024")).unwrap();
        }
        let mut backend = FileBackend::new(dir.path());
        backend.initialize().unwrap();
        assert!(backend.exists("smith2024").unwrap());
    }

    #[test]
    fn backup_and_restore_round_trip() {
        let dir = tempdir().unwrap();
        let backup_dir = tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path().join("data"));
        backend.initialize().unwrap();
        backend.write("smith2024", &entry("smith2024")).unwrap();
        backend.backup_to(backup_dir.path()).unwrap();
        backend.write("doe2025", &entry("doe2025")).unwrap();
        backend.restore_from(backup_dir.path()).unwrap();
        assert!(backend.exists("smith2024").unwrap());
        assert!(!backend.exists("doe2025").unwrap());
    }
}
