use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for tagwright.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (TAGWRIGHT_* prefix)
/// 3. Config file (~/.config/tagwright/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the JSON metadata store.
    ///
    /// Can be set via:
    /// - CLI: --store /path/to/store.json
    /// - ENV: TAGWRIGHT_STORE_PATH
    /// - Config: store_path = "/path/to/store.json"
    /// - Default: ~/.local/share/tagwright/store.json
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Maximum number of cached lookups.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Lifetime of a cached lookup, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Also store every raw provider candidate under `<provider>-raw`.
    #[serde(default)]
    pub persist_raw: bool,

    /// Directory holding `<provider>.toml` field mapping overrides.
    #[serde(default)]
    pub mappings_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
            persist_raw: false,
            mappings_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/tagwright/config.toml
    /// Reads environment variables with TAGWRIGHT_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from the given file (if it exists) and
    /// environment variables.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("tagwright");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with a custom store path.
    ///
    /// This is used when the --store CLI flag is provided.
    pub fn load_with_store_path(store_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.store_path = store_path;
        Ok(config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Returns: ~/.local/share/tagwright/store.json (or platform equivalent)
fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tagwright")
        .join("store.json")
}

fn default_cache_capacity() -> usize {
    tagwright_core::cache::DEFAULT_CAPACITY
}

fn default_cache_ttl_secs() -> u64 {
    tagwright_core::cache::DEFAULT_TTL.as_secs()
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/tagwright/config.toml
/// - macOS: ~/Library/Application Support/tagwright/config.toml
/// - Windows: %APPDATA%\tagwright\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tagwright")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Tagwright Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (TAGWRIGHT_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the JSON metadata store
#
# Every fetched and translated result is appended here, grouped by provider.
#
# Can also be set via:
# - CLI: tagwright --store /custom/store.json lookup ...
# - Environment: TAGWRIGHT_STORE_PATH=/custom/store.json
#
# Default: Platform-specific data directory
#store_path = "/path/to/custom/store.json"

# Lookup cache: at most this many entries, each kept for this many seconds
cache_capacity = 100
cache_ttl_secs = 3600

# Also store the untranslated provider responses under "<provider>-raw"
persist_raw = false

# Directory of field mapping overrides, one "<provider>.toml" per provider:
#
#   provider = "deezer"
#
#   [fields]
#   "title" = "title"
#   "album.title" = "album"
#
#mappings_dir = "/path/to/mappings"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    ensure_config_file_at(&config_file_path())
}

fn ensure_config_file_at(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.store_path.ends_with("tagwright/store.json"));
        assert_eq!(config.cache_capacity, 100);
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert!(!config.persist_raw);
        assert!(config.mappings_dir.is_none());
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_store_path() {
        let custom_path = PathBuf::from("/tmp/test-store.json");
        let config = Config::load_with_store_path(custom_path.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().store_path, custom_path);
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "store_path = \"/data/store.json\"\ncache_capacity = 7\npersist_raw = true\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.store_path, PathBuf::from("/data/store.json"));
        assert_eq!(config.cache_capacity, 7);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert!(config.persist_raw);
    }

    #[test]
    fn test_example_config_parses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, example_config()).unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.cache_capacity, 100);
        assert!(!config.persist_raw);
    }

    #[test]
    fn test_ensure_config_file_creates_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(ensure_config_file_at(&path).unwrap());
        assert!(!ensure_config_file_at(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), example_config());
    }
}
