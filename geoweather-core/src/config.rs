use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    model::{Coordinate, UnitSystem},
    provider::openweather::DEFAULT_BASE_URL,
    workflow::WorkflowSettings,
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default position used when no coordinate is given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// region = "PT"
///
/// [location]
/// latitude = 38.72
/// longitude = -9.14
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Service root; `2.5/weather` is appended to it.
    pub base_url: String,

    /// Explicit unit system. When absent it follows the region.
    pub units: Option<UnitSystem>,

    /// ISO 3166 region code, e.g. "US". When absent it comes from the locale.
    pub region: Option<String>,

    pub timeout_secs: u64,

    pub location: Option<LocationConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: None,
            region: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            location: None,
        }
    }
}

impl Config {
    /// Load config from the platform path and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Override file values with environment values looked up via `get`.
    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(key) = get(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    /// Save config to the platform path.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
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
        let dirs = ProjectDirs::from("dev", "geoweather", "geoweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `geoweather configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Configured region, falling back to the one derived from `locale`.
    pub fn effective_region(&self, locale: Option<&str>) -> Option<String> {
        self.region
            .clone()
            .filter(|r| !r.is_empty())
            .or_else(|| locale.and_then(crate::units::region_from_locale))
    }

    /// Configured units, or the customary ones for `region`.
    pub fn unit_system(&self, region: Option<&str>) -> UnitSystem {
        self.units
            .unwrap_or_else(|| UnitSystem::for_region(region.unwrap_or_default()))
    }

    pub fn default_coordinate(&self) -> Result<Option<Coordinate>> {
        self.location
            .map(|l| Coordinate::new(l.latitude, l.longitude))
            .transpose()
            .context("Invalid [location] in config")
    }

    pub fn set_default_coordinate(&mut self, coordinate: Coordinate) {
        self.location = Some(LocationConfig {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        });
    }

    /// Settings for a workflow run in `region`.
    pub fn workflow_settings(&self, region: Option<&str>) -> Result<WorkflowSettings> {
        Ok(WorkflowSettings {
            api_key: self.api_key()?.to_string(),
            unit_system: self.unit_system(region),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout_secs, 10);
        assert!(cfg.location.is_none());
    }

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains("Hint: run `geoweather configure`"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());
        assert!(cfg.api_key().is_err());
    }

    #[test]
    fn env_overrides_file_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("FILE_KEY".into());

        cfg.apply_env(|k| (k == API_KEY_ENV).then(|| "ENV_KEY".to_string()));
        assert_eq!(cfg.api_key().unwrap(), "ENV_KEY");

        cfg.apply_env(|_| Some(String::new()));
        assert_eq!(cfg.api_key().unwrap(), "ENV_KEY");
    }

    #[test]
    fn parse_partial_toml() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "KEY"
            units = "imperial"

            [location]
            latitude = 38.72
            longitude = -9.14
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key().unwrap(), "KEY");
        assert_eq!(cfg.units, Some(UnitSystem::Imperial));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout_secs, 10);
        assert_eq!(
            cfg.default_coordinate().unwrap(),
            Some(Coordinate { latitude: 38.72, longitude: -9.14 })
        );
    }

    #[test]
    fn invalid_location_is_reported() {
        let mut cfg = Config::default();
        cfg.location = Some(LocationConfig { latitude: 95.0, longitude: 0.0 });

        let err = cfg.default_coordinate().unwrap_err();
        assert!(err.to_string().contains("Invalid [location]"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.region = Some("US".into());
        cfg.set_default_coordinate(Coordinate::new(40.71, -74.0).unwrap());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key().unwrap(), "KEY");
        assert_eq!(loaded.region.as_deref(), Some("US"));
        assert_eq!(loaded.location, cfg.location);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn region_prefers_config_over_locale() {
        let mut cfg = Config::default();
        assert_eq!(cfg.effective_region(Some("en_US.UTF-8")).as_deref(), Some("US"));
        assert_eq!(cfg.effective_region(None), None);

        cfg.region = Some("LR".into());
        assert_eq!(cfg.effective_region(Some("en_GB.UTF-8")).as_deref(), Some("LR"));
    }

    #[test]
    fn units_follow_region_unless_set() {
        let mut cfg = Config::default();
        assert_eq!(cfg.unit_system(Some("US")), UnitSystem::Imperial);
        assert_eq!(cfg.unit_system(Some("PT")), UnitSystem::Metric);
        assert_eq!(cfg.unit_system(None), UnitSystem::Metric);

        cfg.units = Some(UnitSystem::Metric);
        assert_eq!(cfg.unit_system(Some("US")), UnitSystem::Metric);
    }

    #[test]
    fn workflow_settings_need_api_key() {
        let mut cfg = Config::default();
        assert!(cfg.workflow_settings(None).is_err());

        cfg.set_api_key("KEY".into());
        let settings = cfg.workflow_settings(Some("MM")).unwrap();
        assert_eq!(settings.api_key, "KEY");
        assert_eq!(settings.unit_system, UnitSystem::Imperial);
    }
}
