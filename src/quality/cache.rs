//! Quality-report cache (§4.D "Hit-rate statistics are reported"): keyed on a content hash of
//! the entry so an unchanged entry's validation results are never recomputed, with a bounded
//! LRU eviction policy and running hit/miss counters.
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};

use crate::entry::{Entry, ValidationResult};

fn content_hash(entry: &Entry) -> u64 {
    let mut hasher = DefaultHasher::new();
    entry.key.as_str().hash(&mut hasher);
    entry.entry_type.as_str().hash(&mut hasher);
    for (name, value) in entry.fields.iter() {
        name.hash(&mut hasher);
        value.hash(&mut hasher);
    }
    hasher.finish()
}

/// Cache hit/miss counters, exposed to callers as a hit rate (§4.D).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// An LRU cache of quality-check results, keyed by entry content hash.
pub struct QualityCache {
    capacity: usize,
    order: VecDeque<u64>,
    entries: HashMap<u64, Vec<ValidationResult>>,
    stats: CacheStats,
}

impl QualityCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Return the cached result for `entry`, or compute it with `compute` and cache it.
    pub fn get_or_compute(
        &mut self,
        entry: &Entry,
        compute: impl FnOnce(&Entry) -> Vec<ValidationResult>,
    ) -> Vec<ValidationResult> {
        let key = content_hash(entry);
        if let Some(cached) = self.entries.get(&key) {
            self.stats.hits += 1;
            self.touch(key);
            return cached.clone();
        }
        self.stats.misses += 1;
        let result = compute(entry);
        self.insert(key, result.clone());
        result
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.order.iter().position(|k| *k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key);
    }

    fn insert(&mut self, key: u64, value: Vec<ValidationResult>) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key, value);
        self.touch(key);
    }
}
