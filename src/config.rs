//! Configuration loading for exec-gatekeeper
//!
//! One file holds the allowlist and optional host settings. `.yaml`/`.yml`
//! files are read as YAML, anything else as TOML. Both use the same keys.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::frame::{ByteOrder, FrameCodec, DEFAULT_MAX_PAYLOAD, MAX_PAYLOAD_LIMIT};
use crate::rules::RuleSet;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "exec-gatekeeper.yaml";

/// Log file used when the config does not name one
pub const DEFAULT_LOG_FILE: &str = "exec-gatekeeper.log";

/// Failures loading the config. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not load configuration from file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not load configuration from file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration in {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Transport and logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Largest payload read for one frame
    pub max_payload: usize,

    /// Byte order of frame length prefixes
    pub byte_order: ByteOrder,

    /// Refuse oversized frames instead of truncating them
    pub strict_frames: bool,

    /// Enable the log file
    pub log: bool,

    /// Path to the log file
    pub log_path: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_payload: DEFAULT_MAX_PAYLOAD,
            byte_order: ByteOrder::Native,
            strict_frames: false,
            log: true,
            log_path: Some(DEFAULT_LOG_FILE.to_string()),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub host: HostConfig,

    /// Ordered allowlist
    pub allowed: RuleSet,
}

impl Config {
    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?
        };

        config.check().map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    /// Reject settings that parse but cannot be served safely
    pub fn check(&self) -> Result<(), String> {
        if self.host.max_payload > MAX_PAYLOAD_LIMIT {
            return Err(format!(
                "host.max_payload of {} exceeds the limit of {} bytes",
                self.host.max_payload, MAX_PAYLOAD_LIMIT
            ));
        }
        Ok(())
    }

    /// Default config location
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Expand ~ in path strings
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get the log path (expanded), if logging is on
    pub fn log_path(&self) -> Option<PathBuf> {
        if !self.host.log {
            return None;
        }
        self.host.log_path.as_ref().map(|p| Self::expand_path(p))
    }

    /// Frame codec for the configured transport settings
    pub fn codec(&self) -> FrameCodec {
        FrameCodec::new(
            self.host.byte_order,
            self.host.max_payload,
            self.host.strict_frames,
        )
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
