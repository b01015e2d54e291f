//! # Repository layer (§4.H)
//! Typed find/save/delete over a pluggable [`crate::storage::Backend`], a fluent query
//! builder, collection persistence, load-side schema migration, and a manager tying it all
//! together.
mod collection_repo;
mod entry_repo;
mod manager;
mod migrate;
mod query;

pub use collection_repo::CollectionRepository;
pub use entry_repo::EntryRepository;
pub use manager::{RepositoryManager, RepositoryStatistics};
pub use migrate::{migrate_raw_fields, parse_json_interchange};
pub use query::{Operator, Query};
