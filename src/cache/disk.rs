//! Disk-backed cache store.
//!
//! One file per entry inside the cache directory. The file name is the
//! namespaced locator digest, so bulk invalidation can delete exactly the
//! files this system owns and nothing else living in the same directory.
//!
//! Entry format: a header line `{created_unix_secs} {ttl_secs}` followed
//! by the sanitized markup.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::debug;

use super::{CACHE_PREFIX, CacheStore, cache_key};

/// File-per-entry store rooted at a cache directory.
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    /// Open a store at `dir`. The directory is created lazily on the
    /// first `put`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, locator: &str) -> PathBuf {
        self.dir.join(cache_key(locator))
    }

    fn read_entry(path: &Path) -> Option<String> {
        let content = fs::read_to_string(path).ok()?;
        let (header, markup) = content.split_once('\n')?;
        let mut parts = header.split(' ');
        let created: u64 = parts.next()?.parse().ok()?;
        let ttl: u64 = parts.next()?.parse().ok()?;

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .ok()?
            .as_secs();
        if now >= created.saturating_add(ttl) {
            return None;
        }
        Some(markup.to_string())
    }
}

impl CacheStore for DiskStore {
    fn get(&self, locator: &str) -> Option<String> {
        let path = self.entry_path(locator);
        match Self::read_entry(&path) {
            Some(markup) => Some(markup),
            None => {
                // Expired or unreadable entries are dropped on read; a
                // concurrent invalidation racing this remove is fine.
                if path.exists() {
                    let _ = fs::remove_file(&path);
                }
                None
            }
        }
    }

    fn put(&self, locator: &str, markup: &str, ttl: Duration) {
        if fs::create_dir_all(&self.dir).is_err() {
            return;
        }
        let created = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let content = format!("{created} {}\n{markup}", ttl.as_secs());

        // Write-then-rename so concurrent readers never observe a
        // partially written entry.
        let path = self.entry_path(locator);
        let tmp = path.with_extension(format!("tmp{}", std::process::id()));
        if fs::write(&tmp, content).is_ok() && fs::rename(&tmp, &path).is_err() {
            let _ = fs::remove_file(&tmp);
        }
    }

    fn invalidate_all(&self) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        let mut removed = 0usize;
        for entry in entries.flatten() {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(CACHE_PREFIX) {
                if fs::remove_file(entry.path()).is_ok() {
                    removed += 1;
                }
            }
        }
        debug!("cache"; "invalidated {} entries in {}", removed, self.dir.display());
    }
}
