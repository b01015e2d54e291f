//! # Error implementation
//! The main error types which result from normal usage. Each subsystem gets its own error
//! enum; [`Error`] aggregates them for callers who do not care which subsystem failed.
//!
//! Field validators and quality rules never raise: invalid input is represented as data
//! (see [`crate::entry::ValidationResult`]), not as an [`Error`] variant. The variants below
//! are reserved for failures a caller cannot route around: malformed input that cannot be
//! parsed at all, and storage/backend failures.
mod bibtex;
mod citekey;
mod operation;
mod repository;
mod storage;

use thiserror::Error;

pub use self::{
    bibtex::{BibtexError, BibtexErrorKind},
    citekey::CitekeyError,
    operation::OperationError,
    repository::RepositoryError,
    storage::StorageError,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("BibTeX error: {0}")]
    Bibtex(#[from] BibtexError),
    #[error("Citation key error: {0}")]
    Citekey(#[from] CitekeyError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(value.into())
    }
}
