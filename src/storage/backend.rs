//! The storage backend trait (§4.G).
use std::collections::BTreeMap;

use crate::entry::Entry;
use crate::error::StorageError;

/// Entry counts by type and by year, as returned by [`Backend`] implementations that can
/// compute it efficiently and by the repository manager's aggregate statistics (§4.G
/// "get-statistics", §4.H "repository statistics").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendStatistics {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_year: BTreeMap<i32, usize>,
}

/// A pluggable persistence backend for [`Entry`] records, keyed by citation key (§4.G).
///
/// Implementations: [`super::file::FileBackend`], [`super::sqlite::SqliteBackend`],
/// [`super::memory::MemoryBackend`], each wrappable in [`super::cached::CachedBackend`].
pub trait Backend: Send + Sync {
    fn initialize(&mut self) -> Result<(), StorageError>;
    fn read(&self, key: &str) -> Result<Option<Entry>, StorageError>;
    fn write(&mut self, key: &str, entry: &Entry) -> Result<(), StorageError>;
    fn delete(&mut self, key: &str) -> Result<bool, StorageError>;
    fn exists(&self, key: &str) -> Result<bool, StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
    fn close(&mut self) -> Result<(), StorageError>;

    fn supports_transactions(&self) -> bool {
        false
    }

    /// Begin a transaction, if supported. The default backend has none; callers should check
    /// [`Backend::supports_transactions`] first.
    fn begin_transaction(&mut self) -> Result<(), StorageError> {
        Err(StorageError::TransactionsUnsupported)
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        Err(StorageError::TransactionsUnsupported)
    }

    fn rollback(&mut self) -> Result<(), StorageError> {
        Err(StorageError::TransactionsUnsupported)
    }
}
