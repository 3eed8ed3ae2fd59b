//! Time-bounded in-memory result cache.
//!
//! Entries are immutable once inserted and expire by TTL only; there is no
//! explicit eviction. The owner mutates the cache through `&mut self`, so no
//! locking is involved.

use ahash::AHashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.inserted) < self.ttl
    }
}

#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: AHashMap<K, Entry<V>>,
    default_ttl: Duration,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    /// A zero TTL disables caching: nothing is stored.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: AHashMap::new(),
            default_ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Value for `key` if present and not expired.
    pub fn get(&self, key: &K) -> Option<&V> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|e| e.is_fresh(now))
            .map(|e| &e.value)
    }

    pub fn insert(&mut self, key: K, value: V) {
        let ttl = self.default_ttl;
        self.insert_with_ttl(key, value, ttl);
    }

    /// Insert with a per-entry TTL. Expired entries are purged on the way.
    pub fn insert_with_ttl(&mut self, key: K, value: V, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let now = Instant::now();
        self.entries.retain(|_, e| e.is_fresh(now));
        self.entries.insert(
            key,
            Entry {
                value,
                inserted: now,
                ttl,
            },
        );
    }

    /// Number of stored entries, expired ones included until the next insert.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn hit_within_ttl() {
        let mut c = TtlCache::new(Duration::from_secs(60));
        c.insert("a", 1);
        assert_eq!(c.get(&"a"), Some(&1));
        assert_eq!(c.get(&"b"), None);
    }

    #[test]
    fn entry_expires() {
        let mut c = TtlCache::new(Duration::from_secs(60));
        c.insert_with_ttl("a", 1, Duration::from_millis(20));
        sleep(Duration::from_millis(40));
        assert_eq!(c.get(&"a"), None);
    }

    #[test]
    fn zero_ttl_disables() {
        let mut c = TtlCache::new(Duration::ZERO);
        c.insert("a", 1);
        assert!(c.is_empty());
        assert_eq!(c.get(&"a"), None);
    }

    #[test]
    fn expired_entries_purged_on_insert() {
        let mut c = TtlCache::new(Duration::from_secs(60));
        c.insert_with_ttl("old", 1, Duration::from_millis(10));
        sleep(Duration::from_millis(30));
        c.insert("new", 2);
        assert_eq!(c.len(), 1);
        assert_eq!(c.get(&"new"), Some(&2));
    }
}
