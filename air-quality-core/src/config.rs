use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Value shipped in sample `.env` files; treated as "not configured".
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEO_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";

/// Language used for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Id,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Id => "id",
        }
    }

    pub const fn all() -> &'static [Locale] {
        &[Locale::En, Locale::Id]
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Locale {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "id" => Ok(Locale::Id),
            _ => Err(anyhow!("Unknown locale '{value}'. Supported locales: en, id.")),
        }
    }
}

/// Where the device location capability reads its fixes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// JSON file holding the most recent `{lat, lon, timestamp}` fix.
    pub fix_file: Option<PathBuf>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// locale = "en"
///
/// [device]
/// fix_file = "/run/gps/fix.json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_geo_base_url")]
    pub geo_base_url: String,

    #[serde(default)]
    pub locale: Locale,

    #[serde(default)]
    pub device: DeviceConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_geo_base_url() -> String {
    DEFAULT_GEO_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            geo_base_url: default_geo_base_url(),
            locale: Locale::default(),
            device: DeviceConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk (or defaults on first run), then apply the
    /// process environment.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from an explicit path, returning defaults if it doesn't exist.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Override file values with environment variables, looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "air-quality", "airq")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// Returns the API key if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| is_usable_key(k))
    }

    /// False when the key is absent, blank or still the placeholder value.
    pub fn is_api_key_configured(&self) -> bool {
        self.api_key().is_some()
    }
}

pub(crate) fn is_usable_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_not_configured() {
        let cfg = Config::default();
        assert!(!cfg.is_api_key_configured());
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.geo_base_url, DEFAULT_GEO_BASE_URL);
    }

    #[test]
    fn placeholder_and_blank_keys_are_not_configured() {
        let mut cfg = Config::default();

        cfg.api_key = Some(PLACEHOLDER_API_KEY.to_string());
        assert!(!cfg.is_api_key_configured());

        cfg.api_key = Some("   ".to_string());
        assert!(!cfg.is_api_key_configured());

        cfg.set_api_key("  abc123 ".to_string());
        assert!(cfg.is_api_key_configured());
        assert_eq!(cfg.api_key(), Some("abc123"));
    }

    #[test]
    fn env_overrides_file_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        cfg.apply_env(|name| (name == API_KEY_ENV).then(|| "ENV_KEY".to_string()));
        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
    }

    #[test]
    fn blank_env_does_not_clobber_file_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        cfg.apply_env(|_| Some(String::new()));
        assert_eq!(cfg.api_key(), Some("FILE_KEY"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str("api_key = \"K\"\nlocale = \"id\"\n").expect("valid toml");

        assert_eq!(cfg.api_key(), Some("K"));
        assert_eq!(cfg.locale, Locale::Id);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert!(cfg.device.fix_file.is_none());
    }

    #[test]
    fn save_and_load_roundtrip_through_file() {
        let dir = std::env::temp_dir().join(format!("airq-config-test-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("SAVED".into());
        cfg.device.fix_file = Some(PathBuf::from("/tmp/fix.json"));
        cfg.save_to(&path).expect("save should succeed");

        let loaded = Config::load_from(&path).expect("load should succeed");
        assert_eq!(loaded.api_key(), Some("SAVED"));
        assert_eq!(loaded.device.fix_file, Some(PathBuf::from("/tmp/fix.json")));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn locale_parsing() {
        for locale in Locale::all() {
            assert_eq!(Locale::try_from(locale.as_str()).expect("roundtrip"), *locale);
        }
        let err = Locale::try_from("fr").unwrap_err();
        assert!(err.to_string().contains("Unknown locale"));
    }
}
