//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `smarthome.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use chrono::NaiveTime;
use serde::Deserialize;
use smarthome_app::HomeConfig;
use smarthome_domain::time;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Background job settings.
    pub scheduler: SchedulerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Console front end settings.
    pub console: ConsoleConfig,
    /// Devices registered at startup, in order.
    pub devices: Vec<DeviceSeed>,
    /// Daily schedules registered at startup.
    pub schedules: Vec<ScheduleSeed>,
    /// Triggers registered at startup.
    pub triggers: Vec<TriggerSeed>,
}

/// Trigger sweep and shutdown timing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between two trigger sweeps.
    pub sweep_interval_secs: u64,
    /// Milliseconds `stop` waits for in-flight jobs.
    pub stop_grace_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Print every device update on the console.
    pub echo_updates: bool,
}

/// A device to register at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSeed {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub id: String,
    /// Turn the device on right after adding it.
    #[serde(default)]
    pub on: bool,
}

/// A daily device action to register at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSeed {
    pub device: String,
    /// Time of day, `HH:MM:SS` or `HH:MM`.
    pub at: String,
    pub turn_on: bool,
}

impl ScheduleSeed {
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when `at` is not a time of day.
    pub fn time(&self) -> Result<NaiveTime, ConfigError> {
        time::parse_time_of_day(&self.at).map_err(|err| {
            ConfigError::Validation(format!(
                "schedule for {} has invalid time '{}': {err}",
                self.device, self.at
            ))
        })
    }
}

/// A trigger to register at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerSeed {
    pub condition: String,
    pub action: String,
}

impl Config {
    /// Load configuration from `smarthome.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("smarthome.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SMARTHOME_SWEEP_SECS")
            && let Ok(secs) = val.parse()
        {
            self.scheduler.sweep_interval_secs = secs;
        }
        if let Ok(val) = std::env::var("SMARTHOME_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.sweep_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "sweep interval must be non-zero".to_string(),
            ));
        }
        if self.scheduler.stop_grace_ms == 0 {
            return Err(ConfigError::Validation(
                "stop grace period must be non-zero".to_string(),
            ));
        }
        for schedule in &self.schedules {
            schedule.time()?;
        }
        Ok(())
    }

    /// Registry settings derived from the scheduler section.
    #[must_use]
    pub fn home_config(&self) -> HomeConfig {
        HomeConfig {
            sweep_interval: Duration::from_secs(self.scheduler.sweep_interval_secs),
            stop_grace: Duration::from_millis(self.scheduler.stop_grace_ms),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 5,
            stop_grace_ms: 800,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "smarthomed=info,smarthome=info".to_string(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self { echo_updates: true }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
