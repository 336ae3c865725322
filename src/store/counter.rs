//! Counter cache contract and the in-memory engine.
//!
//! Mirrors the primitives of a memcache-style service: `incr` is atomic but
//! fails distinguishably on an absent key, `add` stores only if absent.
//!
//! # Thread Safety
//!
//! Counters are `AtomicU64`, so `incr` only needs the read lock and never
//! contends with other increments. Inserting or removing entries takes the
//! write lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use super::errors::{CacheError, CacheResult};

/// A value held by the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    Counter(u64),
    Text(String),
}

impl CacheValue {
    /// Returns the counter value, if this is a counter
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            CacheValue::Counter(n) => Some(*n),
            CacheValue::Text(_) => None,
        }
    }

    /// Returns the text value, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CacheValue::Text(s) => Some(s),
            CacheValue::Counter(_) => None,
        }
    }
}

/// Increment-capable key/value cache
pub trait CounterCache: Send + Sync {
    /// Reads one entry
    fn get(&self, key: &str) -> CacheResult<Option<CacheValue>>;

    /// Stores an entry unconditionally
    fn set(&self, key: &str, value: CacheValue) -> CacheResult<()>;

    /// Stores an entry only if the key is absent; returns whether it was stored
    fn add(&self, key: &str, value: CacheValue) -> CacheResult<bool>;

    /// Atomically adds `delta` to a counter.
    ///
    /// Returns `Ok(None)` if the key is absent; the caller decides whether to
    /// initialise it.
    fn incr(&self, key: &str, delta: u64) -> CacheResult<Option<u64>>;

    /// Reads every entry whose key starts with `prefix`. Returned keys have
    /// the prefix stripped.
    fn get_multi(&self, prefix: &str) -> CacheResult<HashMap<String, CacheValue>>;

    /// Removes an entry; returns whether it existed
    fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Removes every entry
    fn flush(&self) -> CacheResult<()>;
}

#[derive(Debug)]
enum Slot {
    Counter(AtomicU64),
    Text(String),
}

impl Slot {
    fn from_value(value: CacheValue) -> Self {
        match value {
            CacheValue::Counter(n) => Slot::Counter(AtomicU64::new(n)),
            CacheValue::Text(s) => Slot::Text(s),
        }
    }

    fn to_value(&self) -> CacheValue {
        match self {
            Slot::Counter(n) => CacheValue::Counter(n.load(Ordering::SeqCst)),
            Slot::Text(s) => CacheValue::Text(s.clone()),
        }
    }
}

/// Process-local counter cache
#[derive(Debug, Default)]
pub struct MemoryCounterCache {
    slots: RwLock<HashMap<String, Slot>>,
}

impl MemoryCounterCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.slots.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Returns true if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CounterCache for MemoryCounterCache {
    fn get(&self, key: &str) -> CacheResult<Option<CacheValue>> {
        let slots = self.slots.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(slots.get(key).map(Slot::to_value))
    }

    fn set(&self, key: &str, value: CacheValue) -> CacheResult<()> {
        let mut slots = self.slots.write().map_err(|_| CacheError::LockPoisoned)?;
        slots.insert(key.to_string(), Slot::from_value(value));
        Ok(())
    }

    fn add(&self, key: &str, value: CacheValue) -> CacheResult<bool> {
        let mut slots = self.slots.write().map_err(|_| CacheError::LockPoisoned)?;
        if slots.contains_key(key) {
            return Ok(false);
        }
        slots.insert(key.to_string(), Slot::from_value(value));
        Ok(true)
    }

    fn incr(&self, key: &str, delta: u64) -> CacheResult<Option<u64>> {
        let slots = self.slots.read().map_err(|_| CacheError::LockPoisoned)?;
        match slots.get(key) {
            Some(Slot::Counter(counter)) => {
                let previous = counter.fetch_add(delta, Ordering::SeqCst);
                Ok(Some(previous.saturating_add(delta)))
            }
            Some(Slot::Text(_)) => Err(CacheError::NotACounter(key.to_string())),
            None => Ok(None),
        }
    }

    fn get_multi(&self, prefix: &str) -> CacheResult<HashMap<String, CacheValue>> {
        let slots = self.slots.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(slots
            .iter()
            .filter_map(|(key, slot)| {
                key.strip_prefix(prefix)
                    .map(|rest| (rest.to_string(), slot.to_value()))
            })
            .collect())
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut slots = self.slots.write().map_err(|_| CacheError::LockPoisoned)?;
        Ok(slots.remove(key).is_some())
    }

    fn flush(&self) -> CacheResult<()> {
        let mut slots = self.slots.write().map_err(|_| CacheError::LockPoisoned)?;
        slots.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incr_absent_key_is_none() {
        let cache = MemoryCounterCache::new();
        assert_eq!(cache.incr("missing", 1).unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_add_only_when_absent() {
        let cache = MemoryCounterCache::new();
        assert!(cache.add("k", CacheValue::Counter(1)).unwrap());
        assert!(!cache.add("k", CacheValue::Counter(7)).unwrap());
        assert_eq!(cache.get("k").unwrap(), Some(CacheValue::Counter(1)));
    }

    #[test]
    fn test_incr_existing_counter() {
        let cache = MemoryCounterCache::new();
        cache.set("k", CacheValue::Counter(1)).unwrap();
        assert_eq!(cache.incr("k", 1).unwrap(), Some(2));
        assert_eq!(cache.incr("k", 3).unwrap(), Some(5));
    }

    #[test]
    fn test_incr_text_is_error() {
        let cache = MemoryCounterCache::new();
        cache.set("k", CacheValue::Text("hello".into())).unwrap();
        assert!(matches!(cache.incr("k", 1), Err(CacheError::NotACounter(_))));
    }

    #[test]
    fn test_get_multi_strips_prefix() {
        let cache = MemoryCounterCache::new();
        cache.set("tally:c1:Ada", CacheValue::Counter(2)).unwrap();
        cache.set("tally:c1:Bob", CacheValue::Counter(1)).unwrap();
        cache.set("tally:c2:Ada", CacheValue::Counter(9)).unwrap();

        let entries = cache.get_multi("tally:c1:").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.get("Ada"), Some(&CacheValue::Counter(2)));
        assert_eq!(entries.get("Bob"), Some(&CacheValue::Counter(1)));
    }

    #[test]
    fn test_delete_and_flush() {
        let cache = MemoryCounterCache::new();
        cache.set("a", CacheValue::Counter(1)).unwrap();
        cache.set("b", CacheValue::Text("x".into())).unwrap();

        assert!(cache.delete("a").unwrap());
        assert!(!cache.delete("a").unwrap());

        cache.flush().unwrap();
        assert!(cache.is_empty());
    }
}
