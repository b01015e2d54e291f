//! The conflict-aware import pipeline (§4.J): parse -> process -> validate -> duplicate-check
//! -> conflict-resolution -> write -> complete.
use nonempty::NonEmpty;

use crate::citekey::{generate_key, resolve_collision, CollisionStrategy, KeyPattern};
use crate::dedupe::{merge_entries, DetectorConfig, DuplicateDetector, MergeStrategy};
use crate::entry::{DuplicateMatch, Entry, EntryKey, Severity};
use crate::error::OperationError;
use crate::validate::validate_entry;

use super::executor::OperationExecutor;

/// How to resolve a conflict between an incoming entry and an existing one sharing its key
/// (§4.J "import conflict strategies").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictStrategy {
    Skip,
    Replace,
    Rename,
    Merge,
    /// Defer to [`ImportOptions::ask`]; falls back to [`ConflictStrategy::Skip`] if unset.
    Ask,
}

/// The stage an import run has reached for a given candidate, reported through
/// [`ImportOptions::on_stage`] (§4.J).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Parsing,
    Processing,
    Validation,
    DuplicateCheck,
    ConflictResolution,
    Writing,
    Complete,
}

/// Options controlling a [`run_import`] call (§4.J).
pub struct ImportOptions<'a> {
    pub conflict_strategy: ConflictStrategy,
    pub key_pattern: KeyPattern,
    pub collision_strategy: CollisionStrategy,
    pub on_stage: Option<&'a mut dyn FnMut(ImportStage, &str)>,
    /// Consulted only when `conflict_strategy` is [`ConflictStrategy::Ask`]: given the
    /// existing and incoming entries, returns the strategy to actually apply.
    pub ask: Option<&'a mut dyn FnMut(&Entry, &Entry) -> ConflictStrategy>,
}

impl Default for ImportOptions<'_> {
    fn default() -> Self {
        Self {
            conflict_strategy: ConflictStrategy::Skip,
            key_pattern: KeyPattern::default(),
            collision_strategy: CollisionStrategy::AppendLetter,
            on_stage: None,
            ask: None,
        }
    }
}

/// Per-record outcome plus a summary of an import run (§4.J).
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub imported: Vec<String>,
    pub skipped: Vec<String>,
    pub renamed: Vec<(String, String)>,
    pub merged: Vec<String>,
    pub errors: Vec<String>,
    /// Duplicate matches among the entries now in the repository, surfaced for the caller to
    /// act on separately rather than silently merged -- an import-time conflict is only
    /// detected on an exact key collision, so same-title-different-key duplicates never go
    /// through [`ConflictStrategy`] resolution at all (§4.E, §4.J).
    pub potential_duplicates: Vec<DuplicateMatch>,
}

fn report(options: &mut ImportOptions<'_>, stage: ImportStage, key: &str) {
    if let Some(on_stage) = options.on_stage.as_mut() {
        on_stage(stage, key);
    }
}

/// Run the import pipeline over `candidates` against `executor`'s repository (§4.J): each
/// candidate is validated, checked for an existing entry under the same key, and then
/// written, skipped, replaced, renamed, or merged per `options.conflict_strategy`.
pub fn run_import(
    executor: &mut OperationExecutor,
    candidates: Vec<Entry>,
    mut options: ImportOptions<'_>,
) -> Result<ImportOutcome, OperationError> {
    let mut outcome = ImportOutcome::default();

    for mut candidate in candidates {
        let original_key = candidate.key.as_str().to_owned();
        report(&mut options, ImportStage::Parsing, &original_key);
        report(&mut options, ImportStage::Processing, &original_key);

        report(&mut options, ImportStage::Validation, &original_key);
        let errors: Vec<_> =
            validate_entry(&candidate).into_iter().filter(|r| !r.valid && r.severity == Severity::Error).collect();
        if !errors.is_empty() {
            outcome.errors.push(format!("{original_key}: {} validation error(s)", errors.len()));
            continue;
        }

        report(&mut options, ImportStage::DuplicateCheck, &original_key);
        let existing = executor.repository().entries().find(&original_key)?;

        match existing {
            None => {
                report(&mut options, ImportStage::Writing, &original_key);
                match executor.create(candidate, false)? {
                    r if r.success => outcome.imported.push(original_key.clone()),
                    r => outcome.errors.push(r.message),
                }
            }
            Some(current) => {
                report(&mut options, ImportStage::ConflictResolution, &original_key);
                let strategy = match options.conflict_strategy {
                    ConflictStrategy::Ask => {
                        options.ask.as_mut().map_or(ConflictStrategy::Skip, |ask| ask(&current, &candidate))
                    }
                    other => other,
                };

                match strategy {
                    ConflictStrategy::Ask => outcome.skipped.push(original_key.clone()),
                    ConflictStrategy::Skip => outcome.skipped.push(original_key.clone()),
                    ConflictStrategy::Replace => {
                        report(&mut options, ImportStage::Writing, &original_key);
                        match executor.replace(candidate)? {
                            r if r.success => outcome.imported.push(original_key.clone()),
                            r => outcome.errors.push(r.message),
                        }
                    }
                    ConflictStrategy::Rename => {
                        let base = generate_key(&options.key_pattern, &candidate);
                        let fallback_word =
                            candidate.fields.title.as_deref().and_then(|t| t.split_whitespace().next());
                        let resolved = resolve_collision(
                            &base,
                            |candidate_key| executor.repository().entries().exists(candidate_key).unwrap_or(true),
                            options.collision_strategy,
                            fallback_word,
                        );
                        match resolved {
                            Ok(renamed_key) => match EntryKey::new(renamed_key.clone()) {
                                Ok(key) => {
                                    candidate = Entry::new(key, candidate.entry_type, candidate.fields);
                                    report(&mut options, ImportStage::Writing, &renamed_key);
                                    match executor.create(candidate, false)? {
                                        r if r.success => outcome.renamed.push((original_key.clone(), renamed_key)),
                                        r => outcome.errors.push(r.message),
                                    }
                                }
                                Err(err) => outcome.errors.push(format!("{original_key}: renamed key invalid: {err}")),
                            },
                            Err(err) => outcome.errors.push(format!("{original_key}: {err}")),
                        }
                    }
                    ConflictStrategy::Merge => {
                        let group = NonEmpty::from((current, vec![candidate]));
                        let merged = merge_entries(&group, MergeStrategy::PreferNewest);
                        report(&mut options, ImportStage::Writing, &original_key);
                        match executor.replace(merged)? {
                            r if r.success => outcome.merged.push(original_key.clone()),
                            r => outcome.errors.push(r.message),
                        }
                    }
                }
            }
        }

        report(&mut options, ImportStage::Complete, &original_key);
    }

    let all = executor.repository().entries().find_all()?;
    outcome.potential_duplicates = DuplicateDetector::new(DetectorConfig::default()).find_duplicates(&all);

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryType, Fields};
    use crate::repository::RepositoryManager;

    fn valid_entry(key: &str, title: &str) -> Entry {
        let mut fields = Fields::default();
        fields.set("author", "Smith, John");
        fields.set("title", title);
        fields.set("journal", "Nature");
        fields.set("year", "2024");
        Entry::new(EntryKey::new(key).unwrap(), EntryType::Article, fields)
    }

    #[test]
    fn imports_fresh_entries() {
        let mut executor = OperationExecutor::new(RepositoryManager::in_memory());
        let outcome =
            run_import(&mut executor, vec![valid_entry("a", "Quantum")], ImportOptions::default()).unwrap();
        assert_eq!(outcome.imported, vec!["a".to_owned()]);
    }

    #[test]
    fn skip_strategy_leaves_existing_entry_untouched() {
        let mut executor = OperationExecutor::new(RepositoryManager::in_memory());
        executor.create(valid_entry("a", "Original"), false).unwrap();
        let options = ImportOptions { conflict_strategy: ConflictStrategy::Skip, ..ImportOptions::default() };
        let outcome = run_import(&mut executor, vec![valid_entry("a", "Incoming")], options).unwrap();
        assert_eq!(outcome.skipped, vec!["a".to_owned()]);
        let current = executor.repository().entries().find("a").unwrap().unwrap();
        assert_eq!(current.fields.title.as_deref(), Some("Original"));
    }

    #[test]
    fn replace_strategy_overwrites() {
        let mut executor = OperationExecutor::new(RepositoryManager::in_memory());
        executor.create(valid_entry("a", "Original"), false).unwrap();
        let options = ImportOptions { conflict_strategy: ConflictStrategy::Replace, ..ImportOptions::default() };
        run_import(&mut executor, vec![valid_entry("a", "Incoming")], options).unwrap();
        let current = executor.repository().entries().find("a").unwrap().unwrap();
        assert_eq!(current.fields.title.as_deref(), Some("Incoming"));
    }

    #[test]
    fn rename_strategy_creates_a_disambiguated_key() {
        let mut executor = OperationExecutor::new(RepositoryManager::in_memory());
        executor.create(valid_entry("a", "Original"), false).unwrap();
        let options = ImportOptions { conflict_strategy: ConflictStrategy::Rename, ..ImportOptions::default() };
        let outcome = run_import(&mut executor, vec![valid_entry("a", "Incoming")], options).unwrap();
        assert_eq!(outcome.renamed.len(), 1);
        assert!(executor.repository().entries().find("a").unwrap().is_some());
    }

    #[test]
    fn merge_strategy_unions_keywords() {
        let mut executor = OperationExecutor::new(RepositoryManager::in_memory());
        let mut first = valid_entry("a", "Original");
        first.fields.keywords = vec!["x".into()];
        executor.create(first, false).unwrap();
        let mut second = valid_entry("a", "Original");
        second.fields.keywords = vec!["y".into()];
        let options = ImportOptions { conflict_strategy: ConflictStrategy::Merge, ..ImportOptions::default() };
        let outcome = run_import(&mut executor, vec![second], options).unwrap();
        assert_eq!(outcome.merged, vec!["a".to_owned()]);
        let current = executor.repository().entries().find("a").unwrap().unwrap();
        assert_eq!(current.fields.keywords, vec!["x", "y"]);
    }
}
