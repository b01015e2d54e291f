use thiserror::Error;

use super::RepositoryError;

/// Errors raised by the operations layer (§4.J). Per §7's error-kind table, a lock timeout and
/// a constraint violation are both reported through [`crate::ops::OperationResult`] rather than
/// propagated as a hard error in most call paths; this type exists for the handful of entry
/// points (dry-run setup, generator misuse) that have no sensible partial result to return.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("lock acquisition timed out for key '{0}'")]
    LockTimeout(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
