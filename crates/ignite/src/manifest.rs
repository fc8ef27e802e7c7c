use std::path::Path;
use std::time::Duration;

use ignite_core::config::load_file;
use ignite_core::ConfigError;
use serde::Deserialize;

/// How a simulated component finishes `start`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// Report success after `delay_ms`
    #[default]
    Succeed,
    /// Report failure after `delay_ms`
    Fail,
    /// Return an error from `start`
    Error,
    /// Never report; left to the timeout guard
    Hang,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComponentSpec {
    pub id: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default)]
    pub behavior: Behavior,
}

impl ComponentSpec {
    pub fn new(id: &str, depends_on: &[&str], delay_ms: u64) -> Self {
        Self {
            id: id.to_string(),
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
            delay_ms,
            behavior: Behavior::Succeed,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Component set loaded from a JSON, YAML or TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let manifest: Manifest = load_file(path)?;
        log::debug!("Loaded {} component(s) from {}", manifest.components.len(), path.display());
        Ok(manifest)
    }

    /// Built-in set used when no manifest is given
    pub fn demo() -> Self {
        Self {
            components: vec![
                ComponentSpec::new("player", &[], 120),
                ComponentSpec::new("store", &[], 200),
                ComponentSpec::new("achievement", &["player"], 80),
                ComponentSpec::new("script-host", &[], 40),
            ],
        }
    }
}
