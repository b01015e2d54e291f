//! The entry repository: typed find/save/delete over a [`Backend`] (§4.H).
use crate::entry::{Entry, Severity};
use crate::error::RepositoryError;
use crate::logger::debug;
use crate::storage::Backend;
use crate::validate::validate_entry;

/// Typed find/save/delete/count/exists over a pluggable [`Backend`] (§4.H).
///
/// `save` validates by default and rejects with [`RepositoryError::ValidationFailed`] on any
/// error-severity result, unless the caller explicitly skips validation. Every read passes
/// through [`crate::repository::migrate`]'s coercions implicitly: the backend already stores
/// fully-typed [`Entry`] values, so migration is only exercised on the JSON-interchange import
/// path (§4.H, §6).
pub struct EntryRepository {
    backend: Box<dyn Backend>,
}

impl EntryRepository {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn Backend {
        self.backend.as_mut()
    }

    pub fn find(&self, key: &str) -> Result<Option<Entry>, RepositoryError> {
        Ok(self.backend.read(key)?)
    }

    pub fn find_all(&self) -> Result<Vec<Entry>, RepositoryError> {
        let mut entries = Vec::new();
        for key in self.backend.keys()? {
            if let Some(entry) = self.backend.read(&key)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Save `entry`, validating first unless `skip_validation` is set (§4.H).
    pub fn save(&mut self, entry: &Entry, skip_validation: bool) -> Result<(), RepositoryError> {
        if !skip_validation {
            let errors: Vec<_> =
                validate_entry(entry).into_iter().filter(|r| !r.valid && r.severity == Severity::Error).collect();
            if !errors.is_empty() {
                return Err(RepositoryError::ValidationFailed(errors));
            }
        }
        self.backend.write(entry.key.as_str(), entry)?;
        debug!("saved entry '{}'", entry.key);
        Ok(())
    }

    pub fn delete(&mut self, key: &str) -> Result<bool, RepositoryError> {
        Ok(self.backend.delete(key)?)
    }

    pub fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.backend.keys()?.len())
    }

    pub fn exists(&self, key: &str) -> Result<bool, RepositoryError> {
        Ok(self.backend.exists(key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};
    use crate::storage::MemoryBackend;

    fn valid_entry(key: &str) -> Entry {
        let mut fields = Fields::default();
        fields.set("author", "Smith, John");
        fields.set("title", "Quantum");
        fields.set("journal", "Nature");
        fields.set("year", "2024");
        Entry::new(EntryKey::new(key).unwrap(), EntryType::Article, fields)
    }

    #[test]
    fn save_then_find_round_trips() {
        let mut repo = EntryRepository::new(Box::new(MemoryBackend::new()));
        let e = valid_entry("smith2024");
        repo.save(&e, false).unwrap();
        let found = repo.find("smith2024").unwrap().unwrap();
        assert_eq!(found.key, e.key);
    }

    #[test]
    fn save_rejects_invalid_entry_unless_skipped() {
        let mut repo = EntryRepository::new(Box::new(MemoryBackend::new()));
        let invalid = Entry::new(EntryKey::new("bad").unwrap(), EntryType::Article, Fields::default());
        assert!(repo.save(&invalid, false).is_err());
        assert!(repo.save(&invalid, true).is_ok());
    }

    #[test]
    fn count_and_delete() {
        let mut repo = EntryRepository::new(Box::new(MemoryBackend::new()));
        repo.save(&valid_entry("a"), false).unwrap();
        repo.save(&valid_entry("b"), false).unwrap();
        assert_eq!(repo.count().unwrap(), 2);
        assert!(repo.delete("a").unwrap());
        assert_eq!(repo.count().unwrap(), 1);
    }
}
