//! Concurrent in-memory cache store.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::{CacheStore, cache_key};

struct Entry {
    markup: String,
    stored_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn expired(&self) -> bool {
        self.stored_at.elapsed() >= self.ttl
    }
}

/// Thread-safe in-memory store keyed by locator digest.
///
/// Used by tests and by embedders that do not want cache persistence
/// across restarts.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, locator: &str) -> Option<String> {
        let key = cache_key(locator);
        let expired = match self.entries.get(&key) {
            Some(entry) if entry.expired() => true,
            Some(entry) => return Some(entry.markup.clone()),
            None => return None,
        };
        // Expired entries are dropped lazily on read.
        if expired {
            self.entries.remove(&key);
        }
        None
    }

    fn put(&self, locator: &str, markup: &str, ttl: Duration) {
        self.entries.insert(
            cache_key(locator),
            Entry {
                markup: markup.to_string(),
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    fn invalidate_all(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOC: &str = "https://example.com/icon.svg";
    const MARKUP: &str = r#"<svg><path d="M0 0"/></svg>"#;

    #[test]
    fn test_round_trip() {
        let store = MemoryStore::new();
        store.put(LOC, MARKUP, Duration::from_secs(60));
        assert_eq!(store.get(LOC).as_deref(), Some(MARKUP));
    }

    #[test]
    fn test_miss_on_unknown_locator() {
        let store = MemoryStore::new();
        assert_eq!(store.get(LOC), None);
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let store = MemoryStore::new();
        store.put(LOC, MARKUP, Duration::ZERO);
        assert_eq!(store.get(LOC), None);
        // Lazy removal actually dropped the entry.
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_put_overwrites_wholesale() {
        let store = MemoryStore::new();
        store.put(LOC, MARKUP, Duration::from_secs(60));
        store.put(LOC, "<svg/>", Duration::from_secs(60));
        assert_eq!(store.get(LOC).as_deref(), Some("<svg/>"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_invalidate_all() {
        let store = MemoryStore::new();
        store.put(LOC, MARKUP, Duration::from_secs(60));
        store.put("https://example.com/b.svg", MARKUP, Duration::from_secs(60));
        store.invalidate_all();
        assert_eq!(store.get(LOC), None);
        assert_eq!(store.len(), 0);
    }
}
