use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::service::ServiceId;

/// Environment variable that overrides the stored OpenWeather API key.
pub const OPENWEATHER_KEY_ENV: &str = "CITYCAST_OPENWEATHER_API_KEY";

pub const DEFAULT_DATASET: &str = "geonames-all-cities-with-a-population-1000";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Credentials and endpoint override for a single service.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServiceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// City directory settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListingConfig {
    pub dataset: String,
    pub page_size: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            dataset: DEFAULT_DATASET.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Example TOML:
    /// [services.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub services: HashMap<String, ServiceConfig>,

    #[serde(default)]
    pub listing: ListingConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    /// Environment overrides are applied on top.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            Self::from_toml_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        Ok(cfg.apply_openweather_key_override(std::env::var(OPENWEATHER_KEY_ENV).ok()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        if cfg.listing.page_size == 0 {
            return Err(anyhow!("listing.page_size must be greater than zero"));
        }
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
        let dirs = ProjectDirs::from("dev", "citycast", "citycast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace the stored OpenWeather key with `key` (the value of
    /// [`OPENWEATHER_KEY_ENV`]) unless it is unset or blank.
    fn apply_openweather_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            tracing::debug!("using OpenWeather API key from {OPENWEATHER_KEY_ENV}");
            self.upsert_service_api_key(ServiceId::OpenWeather, key);
        }
        self
    }

    pub fn service_config(&self, id: ServiceId) -> Option<&ServiceConfig> {
        self.services.get(id.as_str())
    }

    /// Set/replace a service API key.
    pub fn upsert_service_api_key(&mut self, id: ServiceId, api_key: String) {
        self.services.entry(id.as_str().to_string()).or_default().api_key = Some(api_key);
    }

    /// Override the base URL of a service; `None` restores the default.
    pub fn set_service_base_url(&mut self, id: ServiceId, base_url: Option<String>) {
        self.services.entry(id.as_str().to_string()).or_default().base_url = base_url;
    }

    /// Returns API key for a service, if present.
    pub fn service_api_key(&self, id: ServiceId) -> Option<&str> {
        self.service_config(id)
            .and_then(|cfg| cfg.api_key.as_deref())
            .filter(|key| !key.is_empty())
    }

    /// Configured base URL without a trailing slash, or the service default.
    pub fn service_base_url(&self, id: ServiceId) -> &str {
        self.service_config(id)
            .and_then(|cfg| cfg.base_url.as_deref())
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or_else(|| id.default_base_url())
    }

    pub fn is_service_configured(&self, id: ServiceId) -> bool {
        !id.requires_api_key() || self.service_api_key(id).is_some()
    }
}
