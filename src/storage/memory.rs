//! In-memory backend (§4.G), used for testing and for the demonstration binary.
use std::collections::HashMap;

use crate::entry::Entry;
use crate::error::StorageError;

use super::backend::Backend;

/// A dictionary-backed backend. Every read and write deep-copies the [`Entry`] (via `Clone`)
/// so no caller can alias another caller's owned copy (§4.G "deep-copy on read/write to
/// prevent aliasing").
#[derive(Default)]
pub struct MemoryBackend {
    store: HashMap<String, Entry>,
    snapshot: Option<HashMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn initialize(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<Entry>, StorageError> {
        Ok(self.store.get(key).cloned())
    }

    fn write(&mut self, key: &str, entry: &Entry) -> Result<(), StorageError> {
        self.store.insert(key.to_owned(), entry.clone());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, StorageError> {
        Ok(self.store.remove(key).is_some())
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.store.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.store.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.store.clear();
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    /// Snapshot the whole store (§4.G "Transactions snapshot the store on enter"). Nested
    /// calls are rejected: the in-memory backend supports one transaction at a time, matching
    /// the single-writer model in §5.
    fn begin_transaction(&mut self) -> Result<(), StorageError> {
        if self.snapshot.is_some() {
            return Err(StorageError::Other("a transaction is already in progress".into()));
        }
        self.snapshot = Some(self.store.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        if self.snapshot.take().is_none() {
            return Err(StorageError::Other("no transaction in progress".into()));
        }
        Ok(())
    }

    /// Discard every change made since [`Backend::begin_transaction`], restoring the
    /// snapshot (§4.G "discard on exception").
    fn rollback(&mut self) -> Result<(), StorageError> {
        match self.snapshot.take() {
            Some(snapshot) => {
                self.store = snapshot;
                Ok(())
            }
            None => Err(StorageError::Other("no transaction in progress".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};

    fn entry(key: &str) -> Entry {
        Entry::new(EntryKey::new(key).unwrap(), EntryType::Misc, Fields::default())
    }

    #[test]
    fn read_after_write_is_a_deep_copy() {
        let mut backend = MemoryBackend::new();
        let e = entry("a");
        backend.write("a", &e).unwrap();
        let mut read_back = backend.read("a").unwrap().unwrap();
        read_back.fields.set("title", "mutated");
        assert_ne!(read_back.fields.title, backend.read("a").unwrap().unwrap().fields.title);
    }

    #[test]
    fn rollback_restores_pre_transaction_state() {
        let mut backend = MemoryBackend::new();
        backend.write("a", &entry("a")).unwrap();
        backend.begin_transaction().unwrap();
        backend.write("b", &entry("b")).unwrap();
        backend.delete("a").unwrap();
        backend.rollback().unwrap();
        assert!(backend.exists("a").unwrap());
        assert!(!backend.exists("b").unwrap());
    }

    #[test]
    fn commit_keeps_changes_made_during_the_transaction() {
        let mut backend = MemoryBackend::new();
        backend.begin_transaction().unwrap();
        backend.write("a", &entry("a")).unwrap();
        backend.commit().unwrap();
        assert!(backend.exists("a").unwrap());
    }
}
