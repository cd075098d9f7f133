use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::provider::ProviderId;

/// Environment variable consulted when no OpenWeather key is stored on disk.
pub const OPENWEATHER_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// City used when nothing else was asked for.
pub const FALLBACK_CITY: &str = "London";

/// Credentials for a single provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Base URLs of the remote services. Overridable so tests can point at a mock server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_openweather_url")]
    pub openweather_url: String,
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
}

fn default_openweather_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            openweather_url: default_openweather_url(),
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default provider id, "openmeteo" or "openweather".
    pub default_provider: Option<String>,

    /// City shown when `show` is run without a location.
    pub default_city: Option<String>,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Config {
    /// The default provider as a strongly-typed ProviderId.
    ///
    /// Open-Meteo needs no credentials, so it is used when nothing is configured.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(s) => ProviderId::try_from(s),
            None => Ok(ProviderId::OpenMeteo),
        }
    }

    pub fn default_city(&self) -> &str {
        self.default_city
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(FALLBACK_CITY)
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
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
        let dirs = ProjectDirs::from("dev", "skyvibe", "skyvibe")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider API key; the first configured provider becomes the default.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });

        if self.default_provider.is_none() {
            self.default_provider = Some(provider_id.to_string());
        }
    }

    /// API key stored in the config file, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    /// API key from the config file, falling back to the environment.
    pub fn resolve_api_key(&self, provider_id: ProviderId) -> Option<String> {
        if let Some(key) = self.provider_api_key(provider_id) {
            return Some(key.to_owned());
        }
        match provider_id {
            ProviderId::OpenWeather => std::env::var(OPENWEATHER_KEY_ENV)
                .ok()
                .filter(|k| !k.trim().is_empty()),
            ProviderId::OpenMeteo => None,
        }
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        !provider_id.requires_api_key() || self.resolve_api_key(provider_id).is_some()
    }
}
