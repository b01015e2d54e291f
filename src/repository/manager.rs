//! The repository manager (§4.H): wires a [`Backend`]-backed [`EntryRepository`] together
//! with a [`CollectionRepository`] and an optional [`MetadataStore`], and provides the
//! operations that span all three -- coordinated delete, aggregate statistics, and bulk
//! import.
use std::collections::BTreeMap;
use std::path::Path;

use crate::entry::Entry;
use crate::error::RepositoryError;
use crate::metadata::MetadataStore;
use crate::storage::{Backend, BackendStatistics, FileBackend, MemoryBackend};

use super::collection_repo::CollectionRepository;
use super::entry_repo::EntryRepository;
use super::query::Query;

/// Aggregate counts across the whole repository (§4.H "repository statistics").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryStatistics {
    pub backend: BackendStatistics,
    pub collection_count: usize,
}

pub struct RepositoryManager {
    entries: EntryRepository,
    collections: CollectionRepository,
    metadata: Option<MetadataStore>,
}

impl RepositoryManager {
    /// Build a manager over an arbitrary backend, with in-memory-only collections and no
    /// metadata store. Use [`RepositoryManager::with_metadata`] to attach one.
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self { entries: EntryRepository::new(backend), collections: CollectionRepository::in_memory(), metadata: None }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// A manager rooted at a directory: entries under `root/entries`, collections sidecar at
    /// `root/collections.json`, and a metadata store at `root/metadata` (§4.H).
    pub fn open_file_backed(root: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let root = root.as_ref();
        let mut backend = FileBackend::new(root.join("entries"));
        backend.initialize()?;
        let collections = CollectionRepository::open(root.join("collections.json"))?;
        let metadata = MetadataStore::open(root.join("metadata"))?;
        Ok(Self { entries: EntryRepository::new(Box::new(backend)), collections, metadata: Some(metadata) })
    }

    pub fn with_metadata(mut self, metadata: MetadataStore) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn entries(&self) -> &EntryRepository {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut EntryRepository {
        &mut self.entries
    }

    pub fn collections(&self) -> &CollectionRepository {
        &self.collections
    }

    pub fn metadata(&self) -> Option<&MetadataStore> {
        self.metadata.as_ref()
    }

    /// Run `query` against every entry currently in the repository.
    pub fn query(&self, query: &Query) -> Result<Vec<Entry>, RepositoryError> {
        Ok(query.execute(&self.entries.find_all()?))
    }

    /// Delete an entry and, when a metadata store is attached, its metadata and notes sidecar
    /// too (§4.H "coordinated delete").
    pub fn delete_cascade(&mut self, key: &str) -> Result<bool, RepositoryError> {
        let removed = self.entries.delete(key)?;
        if removed {
            if let Some(metadata) = &self.metadata {
                metadata.delete_metadata(key)?;
            }
        }
        Ok(removed)
    }

    /// Save every entry in `entries` in order, stopping at the first validation or storage
    /// failure, returning the keys saved before that point (§4.H "bulk import"). See
    /// [`crate::ops`] for the conflict-aware import pipeline built on top of this.
    pub fn import_all(&mut self, entries: &[Entry], skip_validation: bool) -> Result<Vec<String>, RepositoryError> {
        let mut saved = Vec::with_capacity(entries.len());
        for entry in entries {
            self.entries.save(entry, skip_validation)?;
            saved.push(entry.key.as_str().to_owned());
        }
        Ok(saved)
    }

    /// Entry counts by type and year, plus the collection count (§4.H "repository
    /// statistics").
    pub fn statistics(&self) -> Result<RepositoryStatistics, RepositoryError> {
        let entries = self.entries.find_all()?;
        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
        for entry in &entries {
            *by_type.entry(entry.entry_type.as_str().to_owned()).or_insert(0) += 1;
            if let Some(year) = entry.fields.year {
                *by_year.entry(year).or_insert(0) += 1;
            }
        }
        Ok(RepositoryStatistics {
            backend: BackendStatistics { total: entries.len(), by_type, by_year },
            collection_count: self.collections.count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};
    use tempfile::tempdir;

    fn valid_entry(key: &str) -> Entry {
        let mut fields = Fields::default();
        fields.set("author", "Smith, John");
        fields.set("title", "Quantum");
        fields.set("journal", "Nature");
        fields.set("year", "2024");
        Entry::new(EntryKey::new(key).unwrap(), EntryType::Article, fields)
    }

    #[test]
    fn statistics_count_by_type_and_year() {
        let mut manager = RepositoryManager::in_memory();
        manager.entries_mut().save(&valid_entry("a"), false).unwrap();
        manager.entries_mut().save(&valid_entry("b"), false).unwrap();
        let stats = manager.statistics().unwrap();
        assert_eq!(stats.backend.total, 2);
        assert_eq!(stats.backend.by_type.get("article"), Some(&2));
        assert_eq!(stats.backend.by_year.get(&2024), Some(&2));
    }

    #[test]
    fn open_file_backed_wires_up_metadata_and_collections() {
        let dir = tempdir().unwrap();
        let mut manager = RepositoryManager::open_file_backed(dir.path()).unwrap();
        manager.entries_mut().save(&valid_entry("a"), false).unwrap();
        assert!(manager.metadata().is_some());
        assert_eq!(manager.collections().count(), 0);
    }

    #[test]
    fn delete_cascade_removes_metadata_too() {
        let dir = tempdir().unwrap();
        let mut manager = RepositoryManager::open_file_backed(dir.path()).unwrap();
        manager.entries_mut().save(&valid_entry("a"), false).unwrap();
        manager.metadata().unwrap().get_metadata("a").unwrap();
        let mut metadata = manager.metadata().unwrap().get_metadata("a").unwrap();
        metadata.tags.insert("math".to_owned());
        manager.metadata().unwrap().save_metadata(&metadata).unwrap();

        assert!(manager.delete_cascade("a").unwrap());
        assert!(manager.entries().find("a").unwrap().is_none());
        assert!(manager.metadata().unwrap().find_by_tag("math").is_empty());
    }
}
