//! A bounded LRU read cache that wraps any [`Backend`] (§4.G "Cached wrapper").
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::entry::Entry;
use crate::error::StorageError;

use super::backend::Backend;

/// Hit/miss counters for a [`CachedBackend`] (§4.G "Hit/miss counts are observable").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
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

/// A bounded least-recently-used map. `order` tracks recency with the most-recently-used key
/// at the back; eviction pops from the front.
struct Lru {
    capacity: usize,
    map: HashMap<String, Entry>,
    order: VecDeque<String>,
}

impl Lru {
    fn new(capacity: usize) -> Self {
        Self { capacity, map: HashMap::new(), order: VecDeque::new() }
    }

    fn get(&mut self, key: &str) -> Option<Entry> {
        let value = self.map.get(key).cloned()?;
        self.touch(key);
        Some(value)
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let k = self.order.remove(pos).expect("position came from iter");
            self.order.push_back(k);
        }
    }

    fn put(&mut self, key: String, value: Entry) {
        if self.map.contains_key(&key) {
            self.touch(&key);
        } else {
            if self.capacity > 0 && self.map.len() >= self.capacity {
                if let Some(evicted) = self.order.pop_front() {
                    self.map.remove(&evicted);
                }
            }
            self.order.push_back(key.clone());
        }
        self.map.insert(key, value);
    }

    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

/// Wraps any [`Backend`] with a bounded LRU cache over [`Backend::read`]. Any write, delete,
/// or clear invalidates the whole cache rather than tracking per-key staleness, matching
/// §4.G's "writes invalidate the whole read cache for simplicity".
pub struct CachedBackend<B> {
    inner: B,
    cache: Mutex<Lru>,
    stats: Mutex<CacheStats>,
}

impl<B: Backend> CachedBackend<B> {
    pub fn new(inner: B, capacity: usize) -> Self {
        Self { inner, cache: Mutex::new(Lru::new(capacity)), stats: Mutex::new(CacheStats::default()) }
    }

    pub fn stats(&self) -> CacheStats {
        *self.stats.lock().expect("cache stats lock poisoned")
    }

    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: Backend> Backend for CachedBackend<B> {
    fn initialize(&mut self) -> Result<(), StorageError> {
        self.inner.initialize()
    }

    fn read(&self, key: &str) -> Result<Option<Entry>, StorageError> {
        if let Some(cached) = self.cache.lock().expect("cache lock poisoned").get(key) {
            self.stats.lock().expect("cache stats lock poisoned").hits += 1;
            return Ok(Some(cached));
        }
        self.stats.lock().expect("cache stats lock poisoned").misses += 1;
        let value = self.inner.read(key)?;
        if let Some(entry) = &value {
            self.cache.lock().expect("cache lock poisoned").put(key.to_owned(), entry.clone());
        }
        Ok(value)
    }

    fn write(&mut self, key: &str, entry: &Entry) -> Result<(), StorageError> {
        self.inner.write(key, entry)?;
        self.cache.lock().expect("cache lock poisoned").clear();
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, StorageError> {
        let deleted = self.inner.delete(key)?;
        self.cache.lock().expect("cache lock poisoned").clear();
        Ok(deleted)
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.exists(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner.keys()
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.inner.clear()?;
        self.cache.lock().expect("cache lock poisoned").clear();
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        self.inner.close()
    }

    fn supports_transactions(&self) -> bool {
        self.inner.supports_transactions()
    }

    fn begin_transaction(&mut self) -> Result<(), StorageError> {
        self.inner.begin_transaction()
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<(), StorageError> {
        self.cache.lock().expect("cache lock poisoned").clear();
        self.inner.rollback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKey, EntryType, Fields};
    use crate::storage::MemoryBackend;

    fn entry(key: &str) -> Entry {
        Entry::new(EntryKey::new(key).unwrap(), EntryType::Misc, Fields::default())
    }

    #[test]
    fn second_read_is_a_cache_hit() {
        let mut backend = CachedBackend::new(MemoryBackend::new(), 10);
        backend.write("a", &entry("a")).unwrap();
        backend.read("a").unwrap();
        backend.read("a").unwrap();
        let stats = backend.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn write_invalidates_the_whole_cache() {
        let mut backend = CachedBackend::new(MemoryBackend::new(), 10);
        backend.write("a", &entry("a")).unwrap();
        backend.read("a").unwrap();
        backend.write("b", &entry("b")).unwrap();
        backend.read("a").unwrap();
        let stats = backend.stats();
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn capacity_evicts_the_least_recently_used_entry() {
        let mut backend = CachedBackend::new(MemoryBackend::new(), 1);
        backend.write("a", &entry("a")).unwrap();
        backend.write("b", &entry("b")).unwrap();
        backend.read("a").unwrap();
        backend.read("b").unwrap();
        backend.read("a").unwrap();
        let stats = backend.stats();
        assert!(stats.misses >= 2);
    }
}
