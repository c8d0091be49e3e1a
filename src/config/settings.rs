//! Configuration settings for chore-sync.
//!
//! Settings are loaded from `config.yaml` in the data root.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::ChoreSyncError;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Remote store connection.
    pub remote: RemoteConfig,
    /// Reconciliation and cache settings.
    pub sync: SyncConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

/// Remote store (PostgREST) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://example.supabase.co`.
    pub url: Option<String>,
    /// Anonymous API key sent as `apikey` and bearer token.
    pub anon_key: Option<String>,
    /// Database schema the tables live in.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Timeout for the reachability probe in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

/// Reconciliation and cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Safety-net interval between passes while online.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// How often the monitor samples connectivity.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Max age of a cache entry used as fallback when an online fetch fails.
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_secs: u64,
    /// Upper bound on registered sync observers.
    #[serde(default = "default_max_observers")]
    pub max_observers: usize,
}

impl SyncConfig {
    /// Safety-net interval as a [`Duration`].
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Connectivity poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Fallback cache age as a [`Duration`].
    #[must_use]
    pub const fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs)
    }
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

fn default_schema() -> String {
    "chore_chart".to_string()
}

const fn default_timeout() -> u64 {
    30
}

const fn default_connect_timeout() -> u64 {
    10
}

const fn default_probe_timeout() -> u64 {
    3
}

const fn default_interval() -> u64 {
    30
}

const fn default_poll_interval() -> u64 {
    2
}

const fn default_cache_max_age() -> u64 {
    5 * 60
}

const fn default_max_observers() -> usize {
    16
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            schema: default_schema(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            poll_interval_secs: default_poll_interval(),
            cache_max_age_secs: default_cache_max_age(),
            max_observers: default_max_observers(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, ChoreSyncError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, ChoreSyncError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ChoreSyncError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            ChoreSyncError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), ChoreSyncError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| ChoreSyncError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            ChoreSyncError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Apply command-line overrides for the remote connection.
    #[must_use]
    pub fn with_remote_overrides(mut self, url: Option<String>, anon_key: Option<String>) -> Self {
        if url.is_some() {
            self.remote.url = url;
        }
        if anon_key.is_some() {
            self.remote.anon_key = anon_key;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.general.default_output, OutputFormat::Pretty);
        assert_eq!(config.general.color, ColorSetting::Auto);
        assert_eq!(config.remote.schema, "chore_chart");
        assert!(config.remote.url.is_none());
        assert_eq!(config.sync.interval(), Duration::from_secs(30));
        assert_eq!(config.sync.cache_max_age(), Duration::from_secs(300));
        assert_eq!(config.sync.max_observers, 16);
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(config.sync.interval_secs, 30);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut config = Config::default();
        config.remote.url = Some("https://family.example.co".to_string());
        config.sync.interval_secs = 60;

        config.save_to_path(&config_path).unwrap();
        let loaded = Config::load_from_path(&config_path).unwrap();

        assert_eq!(loaded.remote.url.as_deref(), Some("https://family.example.co"));
        assert_eq!(loaded.sync.interval_secs, 60);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let partial_yaml = r#"
remote:
  url: https://family.example.co
sync:
  poll_interval_secs: 5
"#;
        std::fs::write(&config_path, partial_yaml).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(config.remote.url.as_deref(), Some("https://family.example.co"));
        assert_eq!(config.remote.schema, "chore_chart");
        assert_eq!(config.sync.poll_interval_secs, 5);
        assert_eq!(config.sync.interval_secs, 30);
    }

    #[test]
    fn test_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "sync: [not, a, map]").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, ChoreSyncError::Config(_)));
    }

    #[test]
    fn test_remote_overrides() {
        let config = Config::default()
            .with_remote_overrides(Some("https://override.example.co".to_string()), None);
        assert_eq!(config.remote.url.as_deref(), Some("https://override.example.co"));
        assert!(config.remote.anon_key.is_none());
    }
}
