//! Configuration management for `svgin.toml`.
//!
//! # Sections
//!
//! | Section   | Purpose                                          |
//! |-----------|--------------------------------------------------|
//! | `[site]`  | Deployment origin (trust boundary for inlining)  |
//! | `[fetch]` | Timeout and local-host TLS relaxation            |
//! | `[cache]` | Entry time-to-live and cache directory           |

mod error;

pub use error::ConfigError;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::fetch::{DEFAULT_LOCAL_SUFFIXES, is_local_host};
use crate::log;

/// Default config file name.
pub const CONFIG_FILE: &str = "svgin.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing svgin.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Parsed origin URL, set by `finalize` (internal use only)
    #[serde(skip)]
    origin: Option<Url>,

    /// Site settings
    #[serde(default)]
    pub site: SiteConfig,

    /// Fetch settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Deployment origin; only locators resolving to this host are
    /// inlined.
    pub origin: String,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Upper bound on a single retrieval, in seconds.
    pub timeout_secs: u64,
    /// Allow relaxed certificate verification when the origin is a
    /// local/development host. Never applies to other origins.
    pub allow_insecure_local: bool,
    /// Host suffixes recognized as local/development deployments.
    pub local_suffixes: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            allow_insecure_local: true,
            local_suffixes: DEFAULT_LOCAL_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds, fixed per entry at write time.
    pub ttl_secs: u64,
    /// Cache directory, relative to the project root.
    pub dir: PathBuf,
    /// Persist entries across runs. When false an in-memory store is
    /// used and nothing is written to disk.
    pub persistent: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: crate::cache::DEFAULT_TTL.as_secs(),
            dir: PathBuf::from(".svgin/cache"),
            persistent: true,
        }
    }
}

impl Config {
    /// Load configuration, searching upward from cwd when `path` is the
    /// default relative name.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(config_path) = find_config_file(path) else {
            return Err(ConfigError::Validation(format!(
                "config file `{}` not found (searched upward from current directory)",
                path.display()
            )));
        };
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::Io(config_path.clone(), e))?;

        let mut config = Self::from_toml(&content)?;
        config.root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.config_path = config_path;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let de = toml::de::Deserializer::new(content);
        let mut config: Config = serde_ignored::deserialize(de, |path| {
            log!("config"; "unknown key `{}` ignored", path);
        })?;
        config.finalize()?;
        Ok(config)
    }

    /// Validate fields and cache derived values.
    fn finalize(&mut self) -> Result<(), ConfigError> {
        if self.site.origin.is_empty() {
            return Err(ConfigError::Validation(
                "`site.origin` must be set (e.g. \"https://example.com\")".into(),
            ));
        }
        let origin = Url::parse(&self.site.origin).map_err(|e| {
            ConfigError::Validation(format!("`site.origin` is not a valid URL: {e}"))
        })?;
        if origin.host_str().is_none() {
            return Err(ConfigError::Validation(
                "`site.origin` must include a host".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "`fetch.timeout_secs` must be greater than zero".into(),
            ));
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "`cache.ttl_secs` must be greater than zero".into(),
            ));
        }
        self.origin = Some(origin);
        Ok(())
    }

    /// The validated deployment origin.
    pub fn origin(&self) -> &Url {
        // finalize() ran before the config became visible
        self.origin.as_ref().expect("config not finalized")
    }

    /// Per-entry cache time-to-live.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    /// Fetch timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    /// Whether certificate verification may be relaxed: requires the
    /// opt-in flag AND a local/development origin host.
    pub fn relax_tls(&self) -> bool {
        self.fetch.allow_insecure_local
            && self
                .origin()
                .host_str()
                .is_some_and(|h| is_local_host(h, &self.fetch.local_suffixes))
    }

    /// Absolute cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        if self.cache.dir.is_absolute() {
            self.cache.dir.clone()
        } else {
            self.root.join(&self.cache.dir)
        }
    }
}

/// Find config file by searching upward from current directory.
///
/// Starts from cwd and walks up parent directories until finding
/// `config_name`. Returns the absolute path to the config file if found.
fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}
