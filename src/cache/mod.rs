//! Cache stores for sanitized markup.
//!
//! The pipeline takes the store as an injected dependency so tests can
//! substitute an in-memory store for the disk-backed one. Entries live
//! under a reserved key namespace ([`CACHE_PREFIX`]) so bulk
//! invalidation never touches unrelated data sharing the same backing
//! storage.

mod disk;
mod memory;

use std::time::Duration;

use crate::utils::hash;

pub use disk::DiskStore;
pub use memory::MemoryStore;

/// Reserved key namespace for entries this system owns.
pub(crate) const CACHE_PREFIX: &str = "svgin-";

/// Default entry time-to-live: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Key-value store for sanitized markup with per-entry TTL.
///
/// Expired entries read as absent; there are no partial states. `put`
/// overwrites wholesale. Concurrent `get`/`put`/`invalidate_all` must
/// not corrupt the store, but duplicate work under a miss race is
/// accepted (no single-flight guarantee).
pub trait CacheStore: Send + Sync {
    /// Look up sanitized markup for a resource locator.
    fn get(&self, locator: &str) -> Option<String>;

    /// Store sanitized markup, overwriting any existing entry.
    fn put(&self, locator: &str, markup: &str, ttl: Duration);

    /// Remove every entry this system owns, leaving unrelated data in
    /// the same backing store untouched.
    fn invalidate_all(&self);
}

/// Derive the namespaced cache key for a locator.
#[inline]
pub(crate) fn cache_key(locator: &str) -> String {
    format!("{CACHE_PREFIX}{}", hash::digest(locator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_namespaced_and_stable() {
        let key = cache_key("https://example.com/icon.svg");
        assert!(key.starts_with(CACHE_PREFIX));
        assert_eq!(key, cache_key("https://example.com/icon.svg"));
        assert_ne!(key, cache_key("https://example.com/other.svg"));
    }
}
