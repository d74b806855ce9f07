//! Configuration file handling

use serde::Deserialize;
use std::path::Path;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Target service settings
    #[serde(default)]
    pub target: TargetConfig,

    /// Credentials used by the built-in login probe
    #[serde(default)]
    pub credentials: Credentials,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Names of the probes to run; empty runs the whole sequence
    #[serde(default)]
    pub steps: Vec<String>,
}

/// Target service settings
#[derive(Debug, Deserialize, Clone)]
pub struct TargetConfig {
    /// Endpoint root all probe paths are joined to
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

/// Credentials for the authentication endpoint
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Timeout settings in milliseconds
#[derive(Debug, Deserialize, Clone)]
pub struct Timeouts {
    /// Per-step timeout applied to each probe request
    #[serde(default = "default_step_timeout")]
    pub step_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            step_ms: default_step_timeout(),
        }
    }
}

fn default_step_timeout() -> u64 {
    10_000
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.target.base_url, "http://localhost:8080");
        assert_eq!(config.timeouts.step_ms, 10_000);
        assert!(config.steps.is_empty());
    }

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [target]
            base_url = "http://auth.internal:9000"

            [credentials]
            username = "probe@example.com"
            password = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(config.target.base_url, "http://auth.internal:9000");
        assert_eq!(config.credentials.username, "probe@example.com");
        // Unspecified sections fall back to defaults
        assert_eq!(config.timeouts.step_ms, 10_000);
    }
}
