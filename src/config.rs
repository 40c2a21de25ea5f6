//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML config file (`--config FILE`, or `config.toml` in the platform
//!    config directory when present)
//! 3. `HASHDUPE_*` environment variables
//! 4. Command-line flags (applied by the caller)
//!
//! ```toml
//! min_size = "10MB"
//! chunk_size = 1048576
//! strict = false
//! follow_symlinks = false
//! ```

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::parse_size;
use crate::scanner::DEFAULT_CHUNK_SIZE;

/// Prefix for environment overrides, e.g. `HASHDUPE_MIN_SIZE=1MB`.
pub const ENV_PREFIX: &str = "HASHDUPE_";

/// A size threshold written either as plain bytes or as a size string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeSetting {
    /// Plain byte count, e.g. `1024`.
    Bytes(u64),
    /// Human-readable size, e.g. `"10MB"`.
    Text(String),
}

impl SizeSetting {
    /// Resolve to a byte count.
    pub fn bytes(&self) -> Result<u64> {
        match self {
            Self::Bytes(n) => Ok(*n),
            Self::Text(s) => {
                parse_size(s).map_err(|e| anyhow::anyhow!("Invalid min_size '{s}': {e}"))
            }
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default size threshold for `hash` and `search`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<SizeSetting>,
    /// Bytes read per hasher chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Abort the scan on the first per-file error.
    #[serde(default)]
    pub strict: bool,
    /// Follow symbolic links while walking.
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_size: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            strict: false,
            follow_symlinks: false,
        }
    }
}

impl Config {
    /// Load the layered configuration.
    ///
    /// An explicit `path` must exist. Without one, the platform default
    /// file is used if it exists.
    ///
    /// # Errors
    ///
    /// Fails on a missing explicit file, malformed TOML, bad environment
    /// values, or settings that do not validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => {
                if !p.is_file() {
                    bail!("Config file not found: {}", p.display());
                }
                Some(p.to_path_buf())
            }
            None => Self::default_path().filter(|p| p.is_file()),
        };

        if let Some(ref f) = file {
            log::debug!("Loading config from {}", f.display());
        }

        let config: Self = Self::figment(file.as_deref())
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults plus a single TOML file, ignoring the environment.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config: Self = Self::figment(Some(path))
            .extract()
            .with_context(|| format!("Failed to load config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults merged with an optional TOML file.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        match path {
            Some(p) => figment.merge(Toml::file(p)),
            None => figment,
        }
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "hashdupe").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            bail!("chunk_size must be greater than zero");
        }
        self.min_size_bytes()?;
        Ok(())
    }

    /// Configured threshold in bytes, 0 when unset.
    pub fn min_size_bytes(&self) -> Result<u64> {
        self.min_size.as_ref().map_or(Ok(0), SizeSetting::bytes)
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
