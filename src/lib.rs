//! # bibmgr
//! A bibliographic database engine: entity model, BibTeX parsing, field validation, a
//! pluggable quality engine, duplicate detection and merging, citation-key generation,
//! storage backends, a repository layer, a metadata store, and an operations layer tying it
//! all together (see each module's doc comment for its design-note section).
pub mod bibtex;
pub mod citekey;
pub mod dedupe;
pub mod entry;
pub mod error;
pub mod logger;
pub mod metadata;
pub mod ops;
pub mod quality;
pub mod repository;
pub mod storage;
pub mod text;
pub mod validate;

pub use error::Error;

/// A convenience alias for the crate's top-level error type.
pub type Result<T> = std::result::Result<T, Error>;
