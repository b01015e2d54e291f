use thiserror::Error;

use crate::entry::ValidationResult;

use super::StorageError;

/// Errors raised by the repository layer (§4.H), layered over a [`StorageError`] with the
/// additional failure modes `save` introduces: validation gating and migration.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("entry '{0}' not found")]
    NotFound(String),
    #[error("entry '{0}' already exists")]
    AlreadyExists(String),
    #[error("entry failed validation with {} error-severity result(s)", .0.len())]
    ValidationFailed(Vec<ValidationResult>),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
