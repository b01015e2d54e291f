use std::io;

use thiserror::Error;

/// Errors raised by a storage backend (§4.G) or the repository layer built on top of it.
///
/// Per the error-kind table in the design notes: storage I/O errors roll back any partial
/// write and are surfaced to the caller; corrupted records are skipped rather than
/// propagated (see [`crate::storage::Backend::keys`]).
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("key '{0}' does not exist")]
    NotFound(String),
    #[error("key '{0}' already exists")]
    AlreadyExists(String),
    #[error("backend does not support transactions")]
    TransactionsUnsupported,
    #[error("lock acquisition timed out for key '{0}'")]
    LockTimeout(String),
    #[error("{0}")]
    Other(String),
}
