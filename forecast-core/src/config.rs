use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::error::ForecastError;

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
pub const DEFAULT_GEOCODER_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";

pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_WEATHER_BASE_URL: &str = "WEATHER_API_BASE_URL";
pub const ENV_GEOCODER_BASE_URL: &str = "GEOCODER_API_BASE_URL";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Runtime configuration, built once at startup and passed to the clients.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// database_url = "postgres://localhost/weather"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub weather_base_url: String,
    pub geocoder_base_url: String,
    pub database_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            geocoder_base_url: DEFAULT_GEOCODER_BASE_URL.to_string(),
            database_url: None,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides on top.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override fields from `lookup`; empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(url) = get(ENV_WEATHER_BASE_URL) {
            self.weather_base_url = url;
        }
        if let Some(url) = get(ENV_GEOCODER_BASE_URL) {
            self.geocoder_base_url = url;
        }
        if let Some(url) = get(ENV_DATABASE_URL) {
            self.database_url = Some(url);
        }
    }

    pub fn api_key(&self) -> Result<&str, ForecastError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ForecastError::MissingApiKey)
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref().filter(|u| !u.trim().is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// An empty string clears the database URL.
    pub fn set_database_url(&mut self, url: String) {
        self.database_url = if url.trim().is_empty() {
            None
        } else {
            Some(url)
        };
    }
}
