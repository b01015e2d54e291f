//! CRUD over a [`RepositoryManager`] with per-key locking, dry-run support, and structured
//! [`OperationResult`] reporting (§4.J).
use crate::entry::Entry;
use crate::error::OperationError;
use crate::repository::RepositoryManager;

use super::lock::KeyLocks;
use super::result::{OperationKind, OperationResult};

/// Options controlling [`OperationExecutor::bulk`] (§4.J "bulk operations").
#[derive(Debug, Clone, Copy)]
pub struct BulkOptions {
    /// Stop at the first failing item rather than continuing through the batch.
    pub stop_on_error: bool,
    /// Validate each item (threaded through by the caller's per-item closure).
    pub validate: bool,
    /// Wrap the whole batch in the backend's transaction, rolling back on a stopped error.
    /// Only meaningful alongside a transactional backend; ignored otherwise.
    pub atomic: bool,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self { stop_on_error: true, validate: true, atomic: false }
    }
}

/// CRUD over a [`RepositoryManager`] with per-key locking, dry-run support, and structured
/// [`OperationResult`] reporting (§4.J).
pub struct OperationExecutor {
    repository: RepositoryManager,
    locks: KeyLocks,
    dry_run: bool,
}

impl OperationExecutor {
    pub fn new(repository: RepositoryManager) -> Self {
        Self { repository, locks: KeyLocks::with_default_timeout(), dry_run: false }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn repository(&self) -> &RepositoryManager {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut RepositoryManager {
        &mut self.repository
    }

    fn prefix(&self, message: impl std::fmt::Display) -> String {
        if self.dry_run {
            format!("[DRY RUN] {message}")
        } else {
            message.to_string()
        }
    }

    /// Create `entry`, failing if it already exists unless `force` is set (§4.J "create").
    pub fn create(&mut self, entry: Entry, force: bool) -> Result<OperationResult, OperationError> {
        let key = entry.key.as_str().to_owned();
        let _guard = self.locks.acquire(&key, None)?;

        if !force && self.repository.entries().exists(&key)? {
            return Ok(OperationResult::failed(
                OperationKind::Create,
                Some(key.clone()),
                self.prefix(format!("entry '{key}' already exists")),
            ));
        }

        if self.dry_run {
            return Ok(OperationResult::ok(OperationKind::Create, Some(key.clone()), self.prefix(format!("would create '{key}'")))
                .with_after(entry));
        }

        match self.repository.entries_mut().save(&entry, false) {
            Ok(()) => Ok(OperationResult::ok(OperationKind::Create, Some(key), "created entry").with_after(entry)),
            Err(err) => Ok(OperationResult::failed(OperationKind::Create, Some(key), err.to_string())),
        }
    }

    /// Apply `fields` to the existing entry at `key` (§4.J "update").
    pub fn update(&mut self, key: &str, fields: &[(String, String)], validate: bool) -> Result<OperationResult, OperationError> {
        let _guard = self.locks.acquire(key, None)?;
        let Some(before) = self.repository.entries().find(key)? else {
            return Ok(OperationResult::failed(OperationKind::Update, Some(key.to_owned()), format!("entry '{key}' not found")));
        };

        let mut after = before.clone();
        for (field, value) in fields {
            after = after.with_field(field, value.clone());
        }

        if self.dry_run {
            return Ok(OperationResult::ok(OperationKind::Update, Some(key.to_owned()), self.prefix(format!("would update '{key}'")))
                .with_before(before)
                .with_after(after));
        }

        match self.repository.entries_mut().save(&after, !validate) {
            Ok(()) => Ok(OperationResult::ok(OperationKind::Update, Some(key.to_owned()), format!("updated '{key}'"))
                .with_before(before)
                .with_after(after)),
            Err(err) => Ok(OperationResult::failed(OperationKind::Update, Some(key.to_owned()), err.to_string())),
        }
    }

    /// Delete the entry at `key`, cascading to its metadata/notes sidecar when `cascade` is
    /// set (§4.J "delete").
    pub fn delete(&mut self, key: &str, cascade: bool) -> Result<OperationResult, OperationError> {
        let _guard = self.locks.acquire(key, None)?;
        let before = self.repository.entries().find(key)?;

        if self.dry_run {
            return Ok(OperationResult::ok(OperationKind::Delete, Some(key.to_owned()), self.prefix(format!("would delete '{key}'"))));
        }

        let removed =
            if cascade { self.repository.delete_cascade(key)? } else { self.repository.entries_mut().delete(key)? };

        if removed {
            let mut result = OperationResult::ok(OperationKind::Delete, Some(key.to_owned()), format!("deleted '{key}'"));
            if let Some(before) = before {
                result = result.with_before(before);
            }
            Ok(result)
        } else {
            Ok(OperationResult::failed(OperationKind::Delete, Some(key.to_owned()), format!("entry '{key}' not found")))
        }
    }

    /// Overwrite the entry at `entry.key` wholesale (§4.J "replace").
    pub fn replace(&mut self, entry: Entry) -> Result<OperationResult, OperationError> {
        let key = entry.key.as_str().to_owned();
        let _guard = self.locks.acquire(&key, None)?;
        let before = self.repository.entries().find(&key)?;

        if self.dry_run {
            return Ok(OperationResult::ok(OperationKind::Replace, Some(key.clone()), self.prefix(format!("would replace '{key}'")))
                .with_after(entry));
        }

        match self.repository.entries_mut().save(&entry, false) {
            Ok(()) => {
                let mut result =
                    OperationResult::ok(OperationKind::Replace, Some(key), "replaced entry").with_after(entry);
                if let Some(before) = before {
                    result = result.with_before(before);
                }
                Ok(result)
            }
            Err(err) => Ok(OperationResult::failed(OperationKind::Replace, Some(key), err.to_string())),
        }
    }

    /// Run `op` over every item in `items`, honoring `options.stop_on_error` and `atomic`, and
    /// reporting a single summary [`OperationResult`] (§4.J "bulk operations"). `progress` is
    /// called as `(completed, total)` after each item.
    pub fn bulk<T>(
        &mut self,
        items: Vec<T>,
        options: BulkOptions,
        mut progress: impl FnMut(usize, usize),
        mut op: impl FnMut(&mut Self, T) -> Result<OperationResult, OperationError>,
    ) -> Result<OperationResult, OperationError> {
        let total = items.len();
        let mut affected = 0;
        let mut errors = Vec::new();

        if options.atomic {
            let _ = self.repository.entries_mut().backend_mut().begin_transaction();
        }

        for (i, item) in items.into_iter().enumerate() {
            let outcome = op(self, item);
            let failed_message = match outcome {
                Ok(result) if result.success => {
                    affected += 1;
                    None
                }
                Ok(result) => Some(result.message),
                Err(err) => Some(err.to_string()),
            };

            if let Some(message) = failed_message {
                errors.push(message);
                if options.stop_on_error {
                    if options.atomic {
                        let _ = self.repository.entries_mut().backend_mut().rollback();
                    }
                    progress(i + 1, total);
                    let mut result =
                        OperationResult::failed(OperationKind::Bulk, None, "bulk operation stopped on error")
                            .with_affected(affected);
                    result.errors = errors;
                    return Ok(result);
                }
            }
            progress(i + 1, total);
        }

        if options.atomic {
            let _ = self.repository.entries_mut().backend_mut().commit();
        }

        let mut result = OperationResult::ok(OperationKind::Bulk, None, format!("{affected}/{total} succeeded"))
            .with_affected(affected);
        result.errors = errors;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};
    use crate::repository::RepositoryManager;

    fn valid_entry(key: &str) -> Entry {
        let mut fields = Fields::default();
        fields.set("author", "Smith, John");
        fields.set("title", "Quantum");
        fields.set("journal", "Nature");
        fields.set("year", "2024");
        Entry::new(EntryKey::new(key).unwrap(), EntryType::Article, fields)
    }

    #[test]
    fn create_then_read_round_trips() {
        let mut executor = OperationExecutor::new(RepositoryManager::in_memory());
        let result = executor.create(valid_entry("smith2024"), false).unwrap();
        assert!(result.success);
        assert!(executor.repository().entries().exists("smith2024").unwrap());
    }

    #[test]
    fn create_without_force_rejects_existing_key() {
        let mut executor = OperationExecutor::new(RepositoryManager::in_memory());
        executor.create(valid_entry("smith2024"), false).unwrap();
        let result = executor.create(valid_entry("smith2024"), false).unwrap();
        assert!(!result.success);
    }

    #[test]
    fn dry_run_does_not_persist() {
        let mut executor = OperationExecutor::new(RepositoryManager::in_memory()).with_dry_run(true);
        let result = executor.create(valid_entry("smith2024"), false).unwrap();
        assert!(result.success);
        assert!(result.message.starts_with("[DRY RUN]"));
        assert!(!executor.repository().entries().exists("smith2024").unwrap());
    }

    #[test]
    fn update_applies_field_changes() {
        let mut executor = OperationExecutor::new(RepositoryManager::in_memory());
        executor.create(valid_entry("smith2024"), false).unwrap();
        let result = executor.update("smith2024", &[("title".to_owned(), "Revised".to_owned())], true).unwrap();
        assert!(result.success);
        assert_eq!(result.after.unwrap().fields.title.as_deref(), Some("Revised"));
    }

    #[test]
    fn delete_reports_not_found() {
        let mut executor = OperationExecutor::new(RepositoryManager::in_memory());
        let result = executor.delete("missing", false).unwrap();
        assert!(!result.success);
    }

    #[test]
    fn bulk_stops_on_first_error_by_default() {
        let mut executor = OperationExecutor::new(RepositoryManager::in_memory());
        let items = vec![valid_entry("a"), valid_entry("a"), valid_entry("b")];
        let result = executor
            .bulk(items, BulkOptions::default(), |_, _| {}, |exec, entry| exec.create(entry, false))
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.affected, 1);
    }

    #[test]
    fn bulk_continues_past_errors_when_not_stopping() {
        let mut executor = OperationExecutor::new(RepositoryManager::in_memory());
        let items = vec![valid_entry("a"), valid_entry("a"), valid_entry("b")];
        let options = BulkOptions { stop_on_error: false, ..BulkOptions::default() };
        let result = executor.bulk(items, options, |_, _| {}, |exec, entry| exec.create(entry, false)).unwrap();
        assert_eq!(result.affected, 2);
        assert_eq!(result.errors.len(), 1);
    }
}
