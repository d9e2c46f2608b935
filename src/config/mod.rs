//! Application configuration for cilium-status

use crate::cli::OutputFormat;
use crate::error::{Result, StatusError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration stored in ~/.cilium-status/config.toml
///
/// Every value is a default that the matching command line flag overrides.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Namespace Cilium is installed in
    pub namespace: Option<String>,

    /// Default output format
    #[serde(default)]
    pub default_output: OutputFormat,

    /// Whether to use colors
    #[serde(default = "default_true")]
    pub colors: bool,

    /// Number of concurrent status queries
    pub worker_count: Option<usize>,

    /// How long `status --wait` waits, e.g. "5m"
    pub wait_duration: Option<String>,

    /// Name of the Helm release Cilium was installed with
    pub helm_release_name: Option<String>,
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Parsed `wait_duration`
    pub fn wait_duration(&self) -> Result<Option<Duration>> {
        self.wait_duration
            .as_deref()
            .map(|d| {
                humantime::parse_duration(d)
                    .map_err(|e| StatusError::Config(format!("invalid wait_duration {d:?}: {e}")))
            })
            .transpose()
    }
}

/// Get the config directory (~/.cilium-status)
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|h| h.join(".cilium-status"))
        .ok_or_else(|| StatusError::Config("Could not determine home directory".to_string()))
}

/// Load application config from ~/.cilium-status/config.toml
pub fn load_config() -> Result<AppConfig> {
    let path = config_dir()?.join("config.toml");
    if path.exists() {
        let content = std::fs::read_to_string(&path)?;
        parse_config(&content)
    } else {
        Ok(AppConfig {
            colors: true,
            ..Default::default()
        })
    }
}

/// Parse the TOML contents of a config file
pub fn parse_config(content: &str) -> Result<AppConfig> {
    toml::from_str(content).map_err(|e| StatusError::Config(e.to_string()))
}
