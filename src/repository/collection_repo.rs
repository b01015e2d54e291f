//! The collection repository (§4.H).
//!
//! Collections are a distinct record kind from entries (a name, an optional parent, and
//! either an explicit member set or a smart query -- see [`crate::entry::Collection`]), so
//! rather than force them through the entry-shaped [`crate::storage::Backend`] trait, they
//! persist to their own sidecar JSON file using the same atomic tmp-then-rename discipline as
//! the file entry backend. An in-memory-only repository (no path) is available for tests and
//! for [`crate::storage::MemoryBackend`]-backed managers.
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::entry::Collection;
use crate::error::RepositoryError;
use crate::storage::atomic_write;

pub struct CollectionRepository {
    path: Option<PathBuf>,
    collections: RwLock<BTreeMap<String, Collection>>,
}

impl CollectionRepository {
    /// An in-memory-only repository; collections do not survive process restart.
    pub fn in_memory() -> Self {
        Self { path: None, collections: RwLock::new(BTreeMap::new()) }
    }

    /// A repository persisted to `path` as a single sorted JSON object, loaded immediately if
    /// the file already exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let collections = if path.exists() {
            let bytes = std::fs::read(&path).map_err(crate::error::StorageError::Io)?;
            serde_json::from_slice(&bytes).unwrap_or_default()
        } else {
            BTreeMap::new()
        };
        Ok(Self { path: Some(path), collections: RwLock::new(collections) })
    }

    fn flush(&self) -> Result<(), RepositoryError> {
        if let Some(path) = &self.path {
            let map = self.collections.read().expect("collections lock poisoned");
            let data = serde_json::to_vec_pretty(&*map).map_err(crate::error::StorageError::from)?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(crate::error::StorageError::Io)?;
            }
            atomic_write(path, &data)?;
        }
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<Collection> {
        self.collections.read().expect("collections lock poisoned").get(id).cloned()
    }

    pub fn find_all(&self) -> Vec<Collection> {
        self.collections.read().expect("collections lock poisoned").values().cloned().collect()
    }

    /// Collections whose `parent_id` matches `parent_id` (§4.H "parent-id filter").
    pub fn find_by_parent(&self, parent_id: &str) -> Vec<Collection> {
        self.find_all().into_iter().filter(|c| c.parent_id.as_deref() == Some(parent_id)).collect()
    }

    /// Every smart collection (§4.H "smart-collection filter").
    pub fn find_smart(&self) -> Vec<Collection> {
        self.find_all().into_iter().filter(Collection::is_smart).collect()
    }

    pub fn save(&self, collection: Collection) -> Result<(), RepositoryError> {
        self.collections.write().expect("collections lock poisoned").insert(collection.id.clone(), collection);
        self.flush()
    }

    pub fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let removed = self.collections.write().expect("collections lock poisoned").remove(id).is_some();
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    pub fn count(&self) -> usize {
        self.collections.read().expect("collections lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_then_find_in_memory() {
        let repo = CollectionRepository::in_memory();
        let c = Collection::new_manual("c1", "Reading list");
        repo.save(c.clone()).unwrap();
        assert_eq!(repo.find("c1").unwrap().id, c.id);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("collections.json");
        {
            let repo = CollectionRepository::open(&path).unwrap();
            repo.save(Collection::new_manual("c1", "Reading list")).unwrap();
        }
        let repo = CollectionRepository::open(&path).unwrap();
        assert!(repo.find("c1").is_some());
    }

    #[test]
    fn parent_and_smart_filters() {
        let repo = CollectionRepository::in_memory();
        let mut child = Collection::new_manual("c2", "Child");
        child.parent_id = Some("c1".to_owned());
        repo.save(child).unwrap();
        repo.save(Collection::new_smart("c3", "Recent", "year:2024")).unwrap();
        assert_eq!(repo.find_by_parent("c1").len(), 1);
        assert_eq!(repo.find_smart().len(), 1);
    }
}
