//! A thin demonstration binary: parse a BibTeX file, import it, and print a quality report.
use std::collections::HashSet;
use std::process::ExitCode;

use bibmgr::entry::Entry;
use bibmgr::ops::{run_import, ImportOptions, OperationExecutor};
use bibmgr::quality::{build_report, RuleSet};
use bibmgr::repository::RepositoryManager;
use bibmgr::{bibtex, logger};

fn main() -> ExitCode {
    logger::init(log::LevelFilter::Info);

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: bibmgr <file.bib>");
        return ExitCode::FAILURE;
    };

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::error!("could not read '{path}': {err}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = match bibtex::parse_bytes(&bytes) {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error!("could not parse '{path}': {err}");
            return ExitCode::FAILURE;
        }
    };

    for error in &outcome.errors {
        log::warn!("{error}");
    }

    let candidates: Vec<Entry> = outcome
        .entries
        .into_iter()
        .filter_map(|keyed| match keyed.into_entry() {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("skipping record: {err}");
                None
            }
        })
        .collect();

    let mut executor = OperationExecutor::new(RepositoryManager::in_memory());
    let import_outcome = match run_import(&mut executor, candidates, ImportOptions::default()) {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error!("import failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "imported {} entries ({} skipped, {} renamed, {} merged, {} errors)",
        import_outcome.imported.len(),
        import_outcome.skipped.len(),
        import_outcome.renamed.len(),
        import_outcome.merged.len(),
        import_outcome.errors.len(),
    );
    for error in &import_outcome.errors {
        log::warn!("{error}");
    }
    if !import_outcome.potential_duplicates.is_empty() {
        log::info!("{} potential duplicate pair(s) detected", import_outcome.potential_duplicates.len());
    }

    let entries = match executor.repository().entries().find_all() {
        Ok(entries) => entries,
        Err(err) => {
            log::error!("could not load entries for quality report: {err}");
            return ExitCode::FAILURE;
        }
    };
    let report = build_report(&entries, &RuleSet::standard(), None, &[], &HashSet::new());
    log::info!(
        "quality score {:.1} ({} issue(s) across {} entries)",
        report.quality_score(),
        report.total_issues(),
        entries.len(),
    );

    if logger::Logger::has_error() { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
