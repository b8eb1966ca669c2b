//! `cache` command: maintenance of the disk store.

use anyhow::Result;

use crate::cache::{CacheStore, DiskStore};
use crate::cli::CacheAction;
use crate::config::Config;
use crate::log;

pub fn run(config: &Config, action: &CacheAction) -> Result<()> {
    match action {
        CacheAction::Clear => {
            // Deactivation/uninstall hook: leave no orphaned entries
            // behind. Foreign files in the same directory are untouched.
            let store = DiskStore::new(config.cache_dir());
            store.invalidate_all();
            log!("cache"; "cleared {}", config.cache_dir().display());
            Ok(())
        }
    }
}
