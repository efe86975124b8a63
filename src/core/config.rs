//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Postal lookup service used when nothing else is configured
pub const DEFAULT_LOOKUP_URL: &str = "https://api.postalpincode.in";

/// Simulated submission latency when nothing else is configured
pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 1000;

const STATE_FILE_NAME: &str = "enrollment.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yml::Error,
    },
}

/// Enrollment wizard configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the in-progress enrollment is kept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,

    /// Base URL of the PIN code lookup service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_url: Option<String>,

    /// Simulated submission latency in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_delay_ms: Option<u64>,

    /// Default output format for `enroll show`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (accessor fallbacks)

        // 2. Global user config (~/.config/enroll/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                match Self::from_file(&global_path) {
                    Ok(global) => config.merge(global),
                    Err(e) => tracing::warn!("Ignoring config: {}", e),
                }
            }
        }

        // 3. Environment variables
        config.apply_env(|key| std::env::var(key).ok());

        config
    }

    /// Read a single YAML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay `ENROLL_*` variables read through `var`
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("ENROLL_STATE_FILE").filter(|v| !v.is_empty()) {
            self.state_file = Some(PathBuf::from(path));
        }
        if let Some(url) = var("ENROLL_LOOKUP_URL").filter(|v| !v.is_empty()) {
            self.lookup_url = Some(url);
        }
        if let Some(delay) = var("ENROLL_SUBMIT_DELAY_MS") {
            match delay.trim().parse::<u64>() {
                Ok(ms) => self.submit_delay_ms = Some(ms),
                Err(_) => tracing::warn!("Ignoring ENROLL_SUBMIT_DELAY_MS={:?}", delay),
            }
        }
    }

    /// Path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "enroll")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.state_file.is_some() {
            self.state_file = other.state_file;
        }
        if other.lookup_url.is_some() {
            self.lookup_url = other.lookup_url;
        }
        if other.submit_delay_ms.is_some() {
            self.submit_delay_ms = other.submit_delay_ms;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// State file location, falling back to the user data directory
    pub fn state_file(&self) -> PathBuf {
        if let Some(ref path) = self.state_file {
            return path.clone();
        }
        directories::ProjectDirs::from("", "", "enroll")
            .map(|dirs| dirs.data_dir().join(STATE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(STATE_FILE_NAME))
    }

    pub fn lookup_url(&self) -> &str {
        self.lookup_url.as_deref().unwrap_or(DEFAULT_LOOKUP_URL)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms.unwrap_or(DEFAULT_SUBMIT_DELAY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.lookup_url(), DEFAULT_LOOKUP_URL);
        assert_eq!(config.submit_delay(), Duration::from_millis(1000));
        assert!(config.state_file().ends_with(STATE_FILE_NAME));
    }

    #[test]
    fn test_env_overrides_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "lookup_url: http://files.example\nsubmit_delay_ms: 250\n").unwrap();

        let mut config = Config::default();
        config.merge(Config::from_file(&path).unwrap());
        assert_eq!(config.submit_delay(), Duration::from_millis(250));

        let env: HashMap<&str, &str> = [
            ("ENROLL_LOOKUP_URL", "http://env.example"),
            ("ENROLL_SUBMIT_DELAY_MS", "soon"),
        ]
        .into_iter()
        .collect();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.lookup_url(), "http://env.example");
        // Unparseable delay keeps the file value
        assert_eq!(config.submit_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "submit_delay_ms: [not, a, number]\n").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
