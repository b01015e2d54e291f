//! # Duplicate detection and merging (§4.E)
//! Normalizers, similarity metrics, an inverted index, a pairwise/indexed matcher, connected-
//! component clustering, and field-conflict merge strategies for combining duplicates.
mod index;
mod matcher;
mod merge;
mod normalize;
mod similarity;

pub use index::DuplicateIndex;
pub use matcher::{cluster_matches, DetectorConfig, DuplicateDetector};
pub use merge::{merge_entries, MergeStrategy};
pub use normalize::{normalize_author, normalize_author_list, normalize_doi, normalize_title};
pub use similarity::{Custom, Exact, Jaccard, Levenshtein, NGram, SimilarityMetric};
