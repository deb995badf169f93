//! Profile storage and persistence.
//!
//! Handles saving and loading user profiles to/from disk.
//! Cross-platform: uses appropriate config directories for each OS.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::{DEFAULT_CRITICAL_TEMPERATURE, PROFILE_PERFORMANCE, PROFILE_SILENT};
use crate::cooling::{ControlPoint, NormalizedCurve, normalize_profile};
use crate::error::{LiquidError, Result};

// =============================================================================
// Config Path
// =============================================================================

const APP_NAME: &str = "liquid-rust";
const CONFIG_FILE: &str = "config.json";

/// Get the configuration directory path.
/// - Linux: ~/.config/liquid-rust/
/// - Windows: %APPDATA%\liquid-rust\
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .ok_or_else(|| LiquidError::Storage("Could not find config directory".into()))
}

/// Get the full path to the config file.
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

// =============================================================================
// Storage Structures
// =============================================================================

/// Defaults for the `watch` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Temperature source: "cpu" or "gpu"
    #[serde(default = "default_temp_source")]
    pub temperature_source: String,

    /// Update interval in seconds
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Profile name to follow
    #[serde(default = "default_profile")]
    pub profile: String,
}

fn default_temp_source() -> String {
    "cpu".to_string()
}

fn default_interval() -> u64 {
    2
}

fn default_profile() -> String {
    "silent".to_string()
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            temperature_source: default_temp_source(),
            interval: default_interval(),
            profile: default_profile(),
        }
    }
}

/// Main configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Defaults for the `watch` command
    #[serde(default)]
    pub watch: WatchConfig,
    /// Speed profiles by name
    #[serde(default)]
    pub profiles: BTreeMap<String, StoredProfile>,
}

/// Stored speed profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProfile {
    /// Raw (temperature, duty) points as entered
    pub points: Vec<ControlPoint>,
    /// Fail-safe temperature for this profile
    #[serde(default = "default_critical_temperature")]
    pub critical_temperature: i32,
}

fn default_critical_temperature() -> i32 {
    DEFAULT_CRITICAL_TEMPERATURE
}

impl StoredProfile {
    pub fn new(points: Vec<ControlPoint>, critical_temperature: i32) -> Self {
        Self {
            points,
            critical_temperature,
        }
    }

    /// Normalize the stored points against the stored critical temperature.
    pub fn to_curve(&self) -> NormalizedCurve {
        normalize_profile(&self.points, self.critical_temperature)
    }
}

impl AppConfig {
    /// Configuration seeded with the built-in profiles.
    pub fn with_presets() -> Self {
        let mut config = AppConfig::default();
        config.profiles.insert(
            "silent".to_string(),
            StoredProfile::new(PROFILE_SILENT.to_vec(), DEFAULT_CRITICAL_TEMPERATURE),
        );
        config.profiles.insert(
            "performance".to_string(),
            StoredProfile::new(PROFILE_PERFORMANCE.to_vec(), DEFAULT_CRITICAL_TEMPERATURE),
        );
        config
    }

    /// Get a profile by name (case-insensitive).
    pub fn profile(&self, name: &str) -> Result<&StoredProfile> {
        self.profiles
            .get(&name.to_lowercase())
            .ok_or_else(|| LiquidError::InvalidProfile(format!("Profile '{}' not found", name)))
    }

    /// Insert or replace a profile.
    pub fn set_profile(&mut self, name: &str, profile: StoredProfile) {
        self.profiles.insert(name.to_lowercase(), profile);
    }

    /// Remove a profile, returning it.
    pub fn remove_profile(&mut self, name: &str) -> Result<StoredProfile> {
        self.profiles
            .remove(&name.to_lowercase())
            .ok_or_else(|| LiquidError::InvalidProfile(format!("Profile '{}' not found", name)))
    }
}

// =============================================================================
// Storage Functions
// =============================================================================

/// Load configuration from `path`, or defaults if the file does not exist.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| LiquidError::Storage(format!("Failed to read config: {}", e)))?;

    serde_json::from_str(&content)
        .map_err(|e| LiquidError::Storage(format!("Failed to parse config: {}", e)))
}

/// Save configuration to `path`, creating parent directories.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| LiquidError::Storage(format!("Failed to create config dir: {}", e)))?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| LiquidError::Storage(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, content)
        .map_err(|e| LiquidError::Storage(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Load configuration from disk.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&get_config_path()?)
}

/// Save configuration to disk.
pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(&get_config_path()?, config)
}

/// Ensure that the configuration file exists.
/// If it doesn't exist, create it with the built-in profiles.
pub fn ensure_config_exists() -> Result<()> {
    let path = get_config_path()?;
    if path.exists() {
        return Ok(());
    }

    info!("Config file not found. Creating default at {}", path.display());
    save_config_to(&path, &AppConfig::with_presets())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_file() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("liquid-rust-config-{}-{}", std::process::id(), nanos))
            .join(CONFIG_FILE)
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let path = scratch_file();
        assert_eq!(load_config_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = scratch_file();
        let mut config = AppConfig::with_presets();
        config.set_profile(
            "Quiet",
            StoredProfile::new(vec![ControlPoint::new(30, 20), ControlPoint::new(50, 60)], 55),
        );
        save_config_to(&path, &config).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.profile("quiet").unwrap().to_curve().last(), ControlPoint::new(55, 100));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{ "profiles": { "flat": { "points": [[0, 40]] } } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.watch, WatchConfig::default());
        let flat = config.profile("FLAT").unwrap();
        assert_eq!(flat.critical_temperature, DEFAULT_CRITICAL_TEMPERATURE);
        assert_eq!(flat.points, vec![ControlPoint::new(0, 40)]);
    }

    #[test]
    fn test_remove_missing_profile() {
        let mut config = AppConfig::with_presets();
        assert!(config.remove_profile("silent").is_ok());
        assert!(matches!(
            config.remove_profile("silent"),
            Err(LiquidError::InvalidProfile(_))
        ));
    }
}
