//! # Operations layer (§4.J)
//! Safety-net CRUD over the repository layer: per-key reentrant locking with a timeout,
//! structured [`OperationResult`] reporting, dry-run mode, bulk operations, and the
//! conflict-aware import pipeline.
mod executor;
mod import;
mod lock;
mod result;

pub use executor::{BulkOptions, OperationExecutor};
pub use import::{run_import, ConflictStrategy, ImportOptions, ImportOutcome, ImportStage};
pub use lock::{KeyGuard, KeyLocks};
pub use result::{OperationKind, OperationResult};
