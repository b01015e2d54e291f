use serde::{Deserialize, Serialize};

/// How two entries were determined to match (§3). An entry pair may satisfy more than one
/// criterion at once (e.g. a DOI match between entries that also share a title).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    ExactKey,
    Doi,
    Title,
    Author,
    Combined,
}

/// A pair of entries with a computed similarity (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    pub key_a: String,
    pub key_b: String,
    pub score: f64,
    pub match_types: Vec<MatchType>,
    pub matching_fields: Vec<String>,
}

impl DuplicateMatch {
    pub fn new(key_a: impl Into<String>, key_b: impl Into<String>, score: f64) -> Self {
        Self {
            key_a: key_a.into(),
            key_b: key_b.into(),
            score: score.clamp(0.0, 1.0),
            match_types: Vec::new(),
            matching_fields: Vec::new(),
        }
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        if !self.match_types.contains(&match_type) {
            self.match_types.push(match_type);
        }
        self
    }

    pub fn with_matching_field(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.matching_fields.contains(&field) {
            self.matching_fields.push(field);
        }
        self
    }

    /// Returns the same match with its two keys swapped, for the symmetry property in §8.
    pub fn swapped(&self) -> Self {
        Self {
            key_a: self.key_b.clone(),
            key_b: self.key_a.clone(),
            score: self.score,
            match_types: self.match_types.clone(),
            matching_fields: self.matching_fields.clone(),
        }
    }

    /// Whether this match involves the given key on either side.
    pub fn involves(&self, key: &str) -> bool {
        self.key_a == key || self.key_b == key
    }

    /// The other key in the pair, given one of the two.
    pub fn other(&self, key: &str) -> Option<&str> {
        if self.key_a == key {
            Some(&self.key_b)
        } else if self.key_b == key {
            Some(&self.key_a)
        } else {
            None
        }
    }
}
