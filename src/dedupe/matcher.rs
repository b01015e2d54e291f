//! Pairwise duplicate matching and connected-component clustering (§4.E).
use std::collections::{HashMap, HashSet};

use crate::entry::{DuplicateMatch, Entry, MatchType};

use super::index::DuplicateIndex;
use super::normalize::{normalize_author_list, normalize_title};
use super::similarity::{Jaccard, Levenshtein, SimilarityMetric};

/// Tunable thresholds for [`DuplicateDetector`] (§4.E, §9 implementation-defined constants).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    pub title_threshold: f64,
    pub author_threshold: f64,
    pub combined_threshold: f64,
    /// The minimum a tier-5 component (title, author, journal) must score to count toward the
    /// combined score and the "≥ 2 matching fields" gate (§4.E tier 5, §9 implementation-defined
    /// constant).
    pub component_min: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            title_threshold: 0.85,
            author_threshold: 0.7,
            combined_threshold: 0.7,
            component_min: 0.5,
        }
    }
}

/// Finds duplicate matches across a collection of entries, in five precedence tiers: exact
/// citation key, DOI, normalized title, author-list similarity, and a combined title+author
/// score, each contributing at most one [`DuplicateMatch`] per pair (§4.E).
pub struct DuplicateDetector {
    config: DetectorConfig,
    title_sim: Levenshtein,
    author_sim: Jaccard,
}

impl DuplicateDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            title_sim: Levenshtein,
            author_sim: Jaccard,
        }
    }

    /// Find all duplicate matches in `entries`, deduplicated by unordered pair and sorted by
    /// descending score (§4.E).
    pub fn find_duplicates(&self, entries: &[Entry]) -> Vec<DuplicateMatch> {
        let mut index = DuplicateIndex::new();
        index.build(entries);

        let mut best: HashMap<(String, String), DuplicateMatch> = HashMap::new();

        for (i, entry) in entries.iter().enumerate() {
            // Tier 1: exact citation key collision cannot occur among well-formed entries in
            // the same collection, but a caller may be comparing across two sources.
            for (j, other) in entries.iter().enumerate() {
                if i >= j {
                    continue;
                }
                if entry.key == other.key {
                    self.record(&mut best, entry, other, 1.0, MatchType::ExactKey, "key");
                }
            }

            // Tier 2: DOI.
            if let Some(doi) = &entry.fields.doi {
                for key in index.find_by_doi(doi) {
                    if key == entry.key.as_str() {
                        continue;
                    }
                    if let Some(pos) = index.position_of(key) {
                        if pos > i {
                            self.record(&mut best, entry, &entries[pos], 1.0, MatchType::Doi, "doi");
                        }
                    }
                }
            }

            // Tier 3: normalized title equality/similarity, boosted when years also agree
            // (§4.E tier 3).
            if let Some(title) = &entry.fields.title {
                for key in index.find_by_title(title) {
                    if key == entry.key.as_str() {
                        continue;
                    }
                    let Some(pos) = index.position_of(key) else { continue };
                    if pos <= i {
                        continue;
                    }
                    let other = &entries[pos];
                    let Some(other_title) = &other.fields.title else { continue };
                    let score =
                        self.title_sim.compute(&normalize_title(title), &normalize_title(other_title));
                    if score >= self.config.title_threshold {
                        let years_match = years_agree(entry, other);
                        let boosted = if years_match { (score * 1.1).min(1.0) } else { score };
                        self.record(&mut best, entry, other, boosted, MatchType::Title, "title");
                        if years_match {
                            self.record(&mut best, entry, other, boosted, MatchType::Title, "year");
                        }
                    }
                }
            }
        }

        // Tiers 4-5 require a full pairwise scan since author/combined similarity have no exact
        // index key.
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                let (a, b) = (&entries[i], &entries[j]);

                let title_score = match (&a.fields.title, &b.fields.title) {
                    (Some(ta), Some(tb)) => Some(self.title_sim.compute(&normalize_title(ta), &normalize_title(tb))),
                    _ => None,
                };
                let author_score = match (&a.fields.author, &b.fields.author) {
                    (Some(aa), Some(ab)) => Some(self.author_similarity(aa, ab)),
                    _ => None,
                };

                // Tier 4: author match, gated on title similarity also clearing a lower bar
                // (§4.E tier 4).
                if let (Some(author_score), Some(title_score)) = (author_score, title_score) {
                    if author_score >= self.config.author_threshold && title_score > 0.5 {
                        let score = (author_score + title_score) / 2.0;
                        self.record(&mut best, a, b, score, MatchType::Author, "author");
                    }
                }

                // Tier 5: combined score from {title, author, year-equality, journal}, each
                // counted only if it clears `component_min`; at least two must count, and the
                // average of the counted components must clear `combined_threshold` (§4.E
                // tier 5).
                let mut components: Vec<(&str, f64)> = Vec::new();
                if let Some(title_score) = title_score {
                    if title_score >= self.config.component_min {
                        components.push(("title", title_score));
                    }
                }
                if let Some(author_score) = author_score {
                    if author_score >= self.config.component_min {
                        components.push(("author", author_score));
                    }
                }
                if years_agree(a, b) {
                    components.push(("year", 1.0));
                }
                if let (Some(ja), Some(jb)) = (&a.fields.journal, &b.fields.journal) {
                    let journal_score = self.title_sim.compute(&ja.to_lowercase(), &jb.to_lowercase());
                    if journal_score >= self.config.component_min {
                        components.push(("journal", journal_score));
                    }
                }
                if components.len() >= 2 {
                    let combined: f64 =
                        components.iter().map(|(_, score)| score).sum::<f64>() / components.len() as f64;
                    if combined >= self.config.combined_threshold {
                        for (field, _) in &components {
                            self.record(&mut best, a, b, combined, MatchType::Combined, field);
                        }
                    }
                }
            }
        }

        let mut matches: Vec<DuplicateMatch> = best.into_values().collect();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        matches
    }

    fn author_similarity(&self, a: &str, b: &str) -> f64 {
        let na: HashSet<String> = normalize_author_list(a).into_iter().collect();
        let nb: HashSet<String> = normalize_author_list(b).into_iter().collect();
        let joined_a = na.iter().cloned().collect::<Vec<_>>().join(" ");
        let joined_b = nb.iter().cloned().collect::<Vec<_>>().join(" ");
        self.author_sim.compute(&joined_a, &joined_b)
    }

    fn record(
        &self,
        best: &mut HashMap<(String, String), DuplicateMatch>,
        a: &Entry,
        b: &Entry,
        score: f64,
        match_type: MatchType,
        field: &str,
    ) {
        let pair = unordered_pair(a.key.as_str(), b.key.as_str());
        let entry = best
            .entry(pair)
            .or_insert_with(|| DuplicateMatch::new(a.key.as_str(), b.key.as_str(), score));
        if score > entry.score {
            entry.score = score;
        }
        *entry = entry.clone().with_match_type(match_type).with_matching_field(field);
    }
}

fn years_agree(a: &Entry, b: &Entry) -> bool {
    matches!((a.fields.year, b.fields.year), (Some(ya), Some(yb)) if ya == yb)
}

fn unordered_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_owned(), b.to_owned())
    } else {
        (b.to_owned(), a.to_owned())
    }
}

/// Group matches into clusters of mutually related entries via connected components: if A
/// matches B and B matches C, all three are in the same cluster even if A and C were never
/// directly compared (§4.E "Clustering").
pub fn cluster_matches(matches: &[DuplicateMatch]) -> Vec<Vec<String>> {
    let mut parent: HashMap<String, String> = HashMap::new();

    fn find(parent: &mut HashMap<String, String>, key: &str) -> String {
        let next = parent.get(key).cloned().unwrap_or_else(|| key.to_owned());
        if next == key {
            key.to_owned()
        } else {
            let root = find(parent, &next);
            parent.insert(key.to_owned(), root.clone());
            root
        }
    }

    for m in matches {
        parent.entry(m.key_a.clone()).or_insert_with(|| m.key_a.clone());
        parent.entry(m.key_b.clone()).or_insert_with(|| m.key_b.clone());
        let ra = find(&mut parent, &m.key_a);
        let rb = find(&mut parent, &m.key_b);
        if ra != rb {
            parent.insert(ra, rb);
        }
    }

    let mut groups: HashMap<String, Vec<String>> = HashMap::new();
    let keys: Vec<String> = parent.keys().cloned().collect();
    for key in keys {
        let root = find(&mut parent, &key);
        groups.entry(root).or_default().push(key);
    }

    let mut clusters: Vec<Vec<String>> = groups.into_values().collect();
    for cluster in &mut clusters {
        cluster.sort();
    }
    clusters.sort_by(|a, b| a.first().cmp(&b.first()));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};

    fn entry(key: &str, title: &str, author: &str, doi: Option<&str>) -> Entry {
        let mut fields = Fields::default();
        fields.set("title", title);
        fields.set("author", author);
        if let Some(doi) = doi {
            fields.set("doi", doi);
        }
        Entry::new(EntryKey::new(key).unwrap(), EntryType::Article, fields)
    }

    #[test]
    fn doi_match_scores_perfectly() {
        let entries = vec![
            entry("a", "Title A", "Smith, J.", Some("10.1/x")),
            entry("b", "Different Title", "Jones, K.", Some("10.1/x")),
        ];
        let detector = DuplicateDetector::new(DetectorConfig::default());
        let matches = detector.find_duplicates(&entries);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].score, 1.0);
        assert!(matches[0].match_types.contains(&MatchType::Doi));
    }

    #[test]
    fn duplicate_matches_are_symmetric() {
        let entries = vec![
            entry("a", "A Study of Widgets", "Smith, J.", Some("10.1/z")),
            entry("b", "A Study of Widgets", "Smith, J.", Some("10.1/z")),
        ];
        let detector = DuplicateDetector::new(DetectorConfig::default());
        let matches = detector.find_duplicates(&entries);
        let m = &matches[0];
        let swapped = m.swapped();
        assert_eq!(swapped.score, m.score);
        assert_eq!(swapped.key_a, m.key_b);
    }

    #[test]
    fn clustering_transitively_groups_matches() {
        let matches = vec![
            DuplicateMatch::new("a", "b", 0.9),
            DuplicateMatch::new("b", "c", 0.9),
            DuplicateMatch::new("d", "e", 0.9),
        ];
        let clusters = cluster_matches(&matches);
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().any(|c| c == &vec!["a".to_string(), "b".to_string(), "c".to_string()]));
    }

    #[test]
    fn dissimilar_entries_produce_no_match() {
        let entries = vec![
            entry("a", "Quantum Mechanics", "Smith, J.", None),
            entry("b", "Medieval Poetry", "Doe, A.", None),
        ];
        let detector = DuplicateDetector::new(DetectorConfig::default());
        assert!(detector.find_duplicates(&entries).is_empty());
    }
}
