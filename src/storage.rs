//! # Storage backends (§4.G)
//! A uniform [`Backend`] trait over three pluggable persistence strategies: file-per-entry
//! JSON with atomic writes ([`FileBackend`]), an embedded SQLite database with full-text
//! search ([`SqliteBackend`]), and an in-memory store for testing ([`MemoryBackend`]). Any
//! backend can be wrapped in [`CachedBackend`] for a bounded LRU read cache.
mod backend;
mod cached;
mod file;
mod memory;
mod sqlite;

pub use backend::{Backend, BackendStatistics};
pub use cached::{CacheStats, CachedBackend};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// Re-exported for reuse by [`crate::repository`] and [`crate::metadata`], which persist
/// their own record kinds (collections, metadata, notes) with the same atomic-write and
/// filename-sanitization discipline as the entry file backend (§4.G, §4.I).
pub(crate) use file::{atomic_write, sanitize_filename};
