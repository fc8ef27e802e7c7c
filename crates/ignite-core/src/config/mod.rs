//! # Ignite Configuration
//!
//! Scheduler settings are per bootstrap run: the dispatch batch cap, the
//! timeout shared by every component, and the host frame length used by the
//! frame loop. Files are JSON, YAML (`yaml-config` feature) or TOML
//! (`toml-config` feature); the format is chosen from the file extension.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kernel::constants;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown or unsupported config format for path: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse {format} config: {message}")]
    Parse { format: &'static str, message: String },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// File formats accepted by [`load_file`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    #[cfg(feature = "yaml-config")]
    Yaml,
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Label used in parse errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            #[cfg(feature = "yaml-config")]
            Self::Yaml => "YAML",
            #[cfg(feature = "toml-config")]
            Self::Toml => "TOML",
        }
    }

    /// Pick the format from a file extension, ignoring case. Extensions of
    /// formats whose feature is disabled yield `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            #[cfg(feature = "yaml-config")]
            "yml" | "yaml" => Some(Self::Yaml),
            #[cfg(feature = "toml-config")]
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Deserialize `text` in this format
    pub fn parse<T: DeserializeOwned>(&self, text: &str) -> Result<T, ConfigError> {
        let parse_err = |message: String| ConfigError::Parse { format: self.name(), message };
        match self {
            Self::Json => serde_json::from_str(text).map_err(|e| parse_err(e.to_string())),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string())),
            #[cfg(feature = "toml-config")]
            Self::Toml => toml::from_str(text).map_err(|e| parse_err(e.to_string())),
        }
    }
}

/// Read and deserialize a config file, picking the format from its extension
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    format.parse(&text)
}

/// Settings of the bootstrap scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Maximum `Queued -> Initializing` transitions per tick
    pub batch_cap: usize,
    /// Timeout guard duration for every initializing component
    pub timeout_ms: u64,
    /// Host frame length used by the frame loop
    pub frame_ms: u64,
    /// Refuse registrations that close a dependency cycle
    pub reject_cycles: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            batch_cap: constants::DEFAULT_BATCH_CAP,
            timeout_ms: constants::DEFAULT_TIMEOUT_MS,
            frame_ms: constants::DEFAULT_FRAME_MS,
            reject_cycles: false,
        }
    }
}

impl BootstrapConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: BootstrapConfig = load_file(path)?;
        config.validate()?;
        log::debug!("Loaded bootstrap config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_cap == 0 {
            return Err(ConfigError::InvalidValue {
                key: "batch_cap".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_ms".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.frame_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "frame_ms".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_batch_cap(mut self, batch_cap: usize) -> Self {
        self.batch_cap = batch_cap;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_frame_ms(mut self, frame_ms: u64) -> Self {
        self.frame_ms = frame_ms;
        self
    }

    pub fn with_cycle_check(mut self, reject_cycles: bool) -> Self {
        self.reject_cycles = reject_cycles;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

// Test module declaration
#[cfg(test)]
mod tests;
