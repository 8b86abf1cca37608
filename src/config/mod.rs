// ABOUTME: Configuration management for cardiocheck
// Handles API endpoint settings, the default location for hospital lookup, and UI preferences

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::api::types::Coordinates;

const BASE_DIR_NAME: &str = ".cardiocheck";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application version
    #[serde(default = "default_version")]
    pub version: String,

    /// Prediction service connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Default location for nearby hospital lookup
    #[serde(default)]
    pub location: Option<LocationConfig>,

    /// UI preferences
    #[serde(default)]
    pub ui_preferences: UiPreferences,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the prediction service; endpoint paths are joined onto it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LocationConfig> for Coordinates {
    fn from(location: LocationConfig) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPreferences {
    /// Open the help panel when the assessment starts
    #[serde(default)]
    pub show_help_on_start: bool,

    /// Blink the text cursor in numeric fields
    #[serde(default = "default_true")]
    pub cursor_blink: bool,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            show_help_on_start: false,
            cursor_blink: default_true(),
        }
    }
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Lowest precedence first so later files win
        for path in Self::get_config_paths().into_iter().rev() {
            if path.exists() {
                config.merge(Self::load_from_path(&path)?);
            }
        }

        if let Ok(base_url) = std::env::var("CARDIOCHECK_API_URL") {
            config.api.base_url = base_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a single config file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Save configuration to user config directory
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_user_config_dir()?.join("config.toml");
        self.save_to_path(&config_path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    /// Base URL with a trailing slash so relative endpoint paths join beneath it
    pub fn api_base_url(&self) -> Result<Url> {
        let mut raw = self.api.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).with_context(|| format!("Invalid api.base_url '{}'", self.api.base_url))
    }

    pub fn validate(&self) -> Result<()> {
        self.api_base_url()?;

        if let Some(location) = &self.location {
            if !(-90.0..=90.0).contains(&location.latitude) || !(-180.0..=180.0).contains(&location.longitude) {
                anyhow::bail!(
                    "Configured location ({}, {}) is out of range",
                    location.latitude,
                    location.longitude
                );
            }
        }

        Ok(())
    }

    /// Get configuration file paths in order of precedence
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        // 1. Local project config
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(BASE_DIR_NAME).join("config.toml"));
        }

        // 2. User config (~/.cardiocheck/config/config.toml)
        if let Ok(config_dir) = Self::get_user_config_dir() {
            paths.push(config_dir.join("config.toml"));
        }

        // 3. System config
        paths.push(PathBuf::from("/etc/cardiocheck/config.toml"));

        paths
    }

    fn get_user_config_dir() -> Result<PathBuf> {
        Ok(base_dir()?.join("config"))
    }

    /// Merge a higher-precedence config into this one
    fn merge(&mut self, other: AppConfig) {
        if other.api.base_url != default_base_url() {
            self.api.base_url = other.api.base_url;
        }
        if other.api.timeout_secs != default_timeout_secs() {
            self.api.timeout_secs = other.api.timeout_secs;
        }
        if other.location.is_some() {
            self.location = other.location;
        }
        self.ui_preferences = other.ui_preferences;
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            api: ApiConfig::default(),
            location: None,
            ui_preferences: UiPreferences::default(),
        }
    }
}

/// The ~/.cardiocheck directory holding config, logs and the cached session
pub fn base_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(BASE_DIR_NAME))
}

pub fn logs_dir() -> Result<PathBuf> {
    Ok(base_dir()?.join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000/");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.location.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [location]
            latitude = 40.7
            longitude = -74.0
            "#,
        )
        .unwrap();

        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(
            config.location,
            Some(LocationConfig {
                latitude: 40.7,
                longitude: -74.0
            })
        );
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.api.base_url = "https://cardio.example.com/api".to_string();
        config.ui_preferences.show_help_on_start = true;
        config.save_to_path(&path).unwrap();

        let loaded = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_merge_prefers_non_default_values() {
        let mut base = AppConfig::default();
        base.api.timeout_secs = 10;
        base.location = Some(LocationConfig {
            latitude: 1.0,
            longitude: 2.0,
        });

        let mut project = AppConfig::default();
        project.api.base_url = "https://staging.example.com/".to_string();

        base.merge(project);
        assert_eq!(base.api.base_url, "https://staging.example.com/");
        assert_eq!(base.api.timeout_secs, 10);
        assert!(base.location.is_some());
    }

    #[test]
    fn test_api_base_url_gets_trailing_slash() {
        let mut config = AppConfig::default();
        config.api.base_url = "https://cardio.example.com/api".to_string();

        let url = config.api_base_url().unwrap();
        assert_eq!(
            url.join("cardio/predict/").unwrap().as_str(),
            "https://cardio.example.com/api/cardio/predict/"
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.location = Some(LocationConfig {
            latitude: 120.0,
            longitude: 0.0,
        });
        assert!(config.validate().is_err());
    }
}
