//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod locale;
mod pacing;
mod timeouts;

pub use locale::LocaleConfig;
pub use pacing::PacingConfig;
pub use timeouts::{
    TimeoutConfig, DEFAULT_DIALOG_TIMEOUT_MS, DEFAULT_NEXT_PHOTO_TIMEOUT_MS,
    DEFAULT_SAVING_TIMEOUT_MS, DEFAULT_UPDATE_TIMEOUT_MS,
};

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "album-tzfix.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "ALBUM_TZFIX_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "ALBUM_TZFIX";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "ALBUM_TZFIX_LOG";
/// Environment variable for the dry-run album fixture path.
pub const ALBUM_ENV_VAR: &str = "ALBUM_TZFIX_ALBUM";

/// Default timezone every photo is moved to.
pub const DEFAULT_TARGET_TIMEZONE: &str = "GMT+08:00";
/// Default number of consecutive identical dialog positions required.
pub const DEFAULT_STABILITY_WINDOW: usize = 5;

/// Errors produced when a loaded configuration cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timezone label every photo should end up with (e.g. "GMT+08:00").
    pub target_timezone: String,
    /// Per-phase wait budgets.
    pub timeouts: TimeoutConfig,
    /// Delays around simulated interactions.
    pub pacing: PacingConfig,
    /// Consecutive identical dialog positions required before editing.
    pub stability_window: usize,
    /// Host display language markers.
    pub locale: LocaleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_timezone: DEFAULT_TARGET_TIMEZONE.to_string(),
            timeouts: TimeoutConfig::default(),
            pacing: PacingConfig::default(),
            stability_window: DEFAULT_STABILITY_WINDOW,
            locale: LocaleConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `album-tzfix.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the orchestrator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_timezone.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "target_timezone must not be empty".to_string(),
            ));
        }
        if self.stability_window == 0 {
            return Err(ConfigError::Invalid(
                "stability_window must be at least 1".to_string(),
            ));
        }
        if self.pacing.frame_ms == 0 {
            return Err(ConfigError::Invalid(
                "pacing.frame_ms must be positive".to_string(),
            ));
        }
        let t = &self.timeouts;
        if [t.dialog_ms, t.update_ms, t.saving_ms, t.next_photo_ms].contains(&0) {
            return Err(ConfigError::Invalid(
                "timeouts must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Create config for testing: brisk pacing, two-second budgets.
    pub fn for_test() -> Self {
        Self {
            timeouts: TimeoutConfig::uniform(2000),
            pacing: PacingConfig::brisk(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.target_timezone, "GMT+08:00");
        assert_eq!(config.stability_window, 5);
        assert_eq!(config.timeouts.dialog_ms, DEFAULT_DIALOG_TIMEOUT_MS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_for_test() {
        let config = Config::for_test();
        assert_eq!(config.timeouts.update_ms, 2000);
        assert_eq!(config.pacing.frame_ms, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_timezone() {
        let config = Config {
            target_timezone: "  ".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let config = Config {
            stability_window: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.timeouts.saving_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "target_timezone: GMT+09:00\ntimeouts:\n  update_ms: 3000\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.target_timezone, "GMT+09:00");
        assert_eq!(config.timeouts.update_ms, 3000);
        assert_eq!(config.timeouts.dialog_ms, DEFAULT_DIALOG_TIMEOUT_MS);
        assert_eq!(config.locale.morning_marker, "上午");
    }
}
