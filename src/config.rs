//! MatchBridge configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::coordinator::CoordinatorConfig;
use crate::host::HostConfig;

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".matchbridge.yml";

/// Highest accepted host tick rate; keeps the tick period a usable duration
pub const MAX_TICK_RATE_HZ: u32 = 1000;

/// Main MatchBridge configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Flags for coordinators the host creates
    pub coordinator: CoordinatorConfig,

    /// Host runtime settings
    pub host: HostConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.host.tick_rate_hz == 0 {
            return Err(eyre::eyre!("host.tick-rate-hz must be greater than zero"));
        }
        if self.host.tick_rate_hz > MAX_TICK_RATE_HZ {
            return Err(eyre::eyre!("host.tick-rate-hz must be at most {}", MAX_TICK_RATE_HZ));
        }
        if self.host.sdk_service_key.trim().is_empty() {
            return Err(eyre::eyre!("host.sdk-service-key must not be empty"));
        }
        if self.host.scheduler.max_fires_per_advance == 0 {
            return Err(eyre::eyre!("host.scheduler.max-fires-per-advance must be greater than zero"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .matchbridge.yml
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/matchbridge/matchbridge.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("matchbridge").join("matchbridge.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.coordinator.auto_initialize);
        assert!(!config.coordinator.show_debug_overlay);
        assert_eq!(config.host.tick_rate_hz, 60);
        assert_eq!(config.host.sdk_service_key, "matchbridge.sdk");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
coordinator:
  auto-initialize: false
  use-built-in-ui: false
  persist-across-scenes: false
  show-debug-overlay: true

host:
  tick-rate-hz: 30
  sdk-service-key: studio.sdk
  scheduler:
    max-fires-per-advance: 16
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert!(!config.coordinator.auto_initialize);
        assert!(!config.coordinator.use_built_in_ui);
        assert!(!config.coordinator.persist_across_scenes);
        assert!(config.coordinator.show_debug_overlay);
        assert_eq!(config.host.tick_rate_hz, 30);
        assert_eq!(config.host.sdk_service_key, "studio.sdk");
        assert_eq!(config.host.scheduler.max_fires_per_advance, 16);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
coordinator:
  show-debug-overlay: true
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert!(config.coordinator.show_debug_overlay);

        // Defaults for unspecified
        assert!(config.coordinator.auto_initialize);
        assert!(config.coordinator.persist_across_scenes);
        assert_eq!(config.host.tick_rate_hz, 60);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.host.tick_rate_hz = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.host.tick_rate_hz = MAX_TICK_RATE_HZ;
        assert!(config.validate().is_ok());
        config.host.tick_rate_hz = MAX_TICK_RATE_HZ + 1;
        assert!(config.validate().is_err());
        config.host.tick_rate_hz = 4_000_000_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most"));

        let mut config = Config::default();
        config.host.sdk_service_key = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.host.scheduler.max_fires_per_advance = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("custom.yml");
        fs::write(&path, "host:\n  tick-rate-hz: 120\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.host.tick_rate_hz, 120);
    }

    #[test]
    fn test_load_explicit_missing_path_errors() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_load_local_config() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(LOCAL_CONFIG_FILE), "host:\n  tick-rate-hz: 24\n").unwrap();

        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp.path()).unwrap();
        let result = Config::load(None);
        std::env::set_current_dir(original).unwrap();

        assert_eq!(result.unwrap().host.tick_rate_hz, 24);
    }

    #[test]
    #[serial]
    fn test_load_malformed_local_config_falls_back() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(LOCAL_CONFIG_FILE), "host: [not, a, map").unwrap();

        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp.path()).unwrap();
        let result = Config::load(None);
        std::env::set_current_dir(original).unwrap();

        assert!(result.is_ok());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Config::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("tick-rate-hz: 60"));

        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
