use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Default OpenWeather data endpoint base.
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
/// Default OpenWeather geocoding endpoint base.
pub const DEFAULT_GEOCODE_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";

/// Environment variable holding the provider API key.
pub const API_KEY_VAR: &str = "OPENWEATHER_API_KEY";
const WEATHER_URL_VAR: &str = "SKYCAST_WEATHER_URL";
const GEOCODE_URL_VAR: &str = "SKYCAST_GEOCODE_URL";
const PERSIST_URL_VAR: &str = "SKYCAST_PERSIST_URL";
const PERSIST_KEY_VAR: &str = "SKYCAST_PERSIST_KEY";

/// Connection details for the optional persistence backend.
///
/// Consumed only by [`crate::persistence::PersistenceClient`]; the dashboard
/// core itself never touches it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PersistenceConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

/// Top-level configuration, stored on disk and overridable via environment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeather API key. Required by every adapter operation; its absence
    /// is checked per call, not once at startup.
    pub api_key: Option<String>,

    /// Override for the weather endpoint base URL.
    pub weather_base_url: Option<String>,

    /// Override for the geocoding endpoint base URL.
    pub geocode_base_url: Option<String>,

    /// Example TOML:
    /// [persistence]
    /// base_url = "https://backend.example.com"
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Config {
    /// Effective weather endpoint base, falling back to the public provider.
    pub fn weather_base_url(&self) -> &str {
        self.weather_base_url
            .as_deref()
            .unwrap_or(DEFAULT_WEATHER_BASE_URL)
    }

    /// Effective geocoding endpoint base.
    pub fn geocode_base_url(&self) -> &str {
        self.geocode_base_url
            .as_deref()
            .unwrap_or(DEFAULT_GEOCODE_BASE_URL)
    }

    /// Load config from disk, then apply environment overrides. A missing
    /// file is not an error; it yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Overlay values from the process environment onto this config.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_VAR) {
            self.api_key = Some(key);
        }
        if let Ok(url) = std::env::var(WEATHER_URL_VAR) {
            self.weather_base_url = Some(url);
        }
        if let Ok(url) = std::env::var(GEOCODE_URL_VAR) {
            self.geocode_base_url = Some(url);
        }
        if let Ok(url) = std::env::var(PERSIST_URL_VAR) {
            self.persistence.base_url = Some(url);
        }
        if let Ok(key) = std::env::var(PERSIST_KEY_VAR) {
            self.persistence.api_key = Some(key);
        }
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
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_default_to_public_provider() {
        let cfg = Config::default();
        assert_eq!(cfg.weather_base_url(), DEFAULT_WEATHER_BASE_URL);
        assert_eq!(cfg.geocode_base_url(), DEFAULT_GEOCODE_BASE_URL);
    }

    #[test]
    fn explicit_base_urls_win_over_defaults() {
        let cfg = Config {
            weather_base_url: Some("http://localhost:9000".into()),
            geocode_base_url: Some("http://localhost:9001".into()),
            ..Config::default()
        };
        assert_eq!(cfg.weather_base_url(), "http://localhost:9000");
        assert_eq!(cfg.geocode_base_url(), "http://localhost:9001");
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            weather_base_url: None,
            geocode_base_url: None,
            persistence: PersistenceConfig {
                base_url: Some("https://backend.example.com".into()),
                api_key: Some("PKEY".into()),
            },
        };

        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.api_key.as_deref(), Some("KEY"));
        assert_eq!(
            parsed.persistence.base_url.as_deref(),
            Some("https://backend.example.com")
        );
        assert_eq!(parsed.persistence.api_key.as_deref(), Some("PKEY"));
    }

    #[test]
    fn persistence_section_is_optional_in_toml() {
        let parsed: Config = toml::from_str("api_key = \"KEY\"").unwrap();
        assert_eq!(parsed.api_key.as_deref(), Some("KEY"));
        assert!(parsed.persistence.base_url.is_none());
    }
}
