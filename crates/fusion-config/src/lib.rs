//! Configuration loading for Fusion
//!
//! YAML-based host configuration covering the pipeline tunables: database
//! location, channel capacity, clustering windows, and the thumbnail fetch
//! deadline. Everything has a sensible default; an absent file is not an
//! error for `load_or_default`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use fusion_clustering::ClusterConfig;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML
    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Thumbnail fetch settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Deadline for one vendor snapshot fetch, in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 5,
        }
    }
}

/// Top-level Fusion configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FusionConfig {
    /// Path to the SQLite database (None = in-memory)
    pub database_path: Option<PathBuf>,

    /// Broadcast channel capacity (None = crate default)
    pub channel_capacity: Option<usize>,

    /// Clustering window settings
    pub clustering: ClusterConfig,

    /// Thumbnail fetch settings
    pub thumbnail: ThumbnailConfig,
}

impl FusionConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config: FusionConfig =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is absent
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.clustering.default_window_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "clustering.default_window_secs".into(),
                reason: "must be positive".into(),
            });
        }
        if self.clustering.same_device_window_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "clustering.same_device_window_secs".into(),
                reason: "must be positive".into(),
            });
        }
        if self.clustering.same_device_window_secs > self.clustering.default_window_secs {
            return Err(ConfigError::InvalidValue {
                key: "clustering.same_device_window_secs".into(),
                reason: "must not exceed default_window_secs".into(),
            });
        }
        if self.thumbnail.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "thumbnail.fetch_timeout_secs".into(),
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}
