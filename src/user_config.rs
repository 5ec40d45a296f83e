//! User-level configuration loaded from `~/.item-service/config.toml`.
//!
//! The file is optional; if it does not exist all fields fall back to their
//! `Default` values.

use crate::services::{ServiceSettings, DEFAULT_EXPORT_DELAY, DEFAULT_MIRROR_DELAY};
use crate::tasks::{Location, Queue};
use crate::utils::service_home;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum UserConfigError {
    #[error("Failed to read user config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse user config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid duration for '{field}': {source}")]
    Duration {
        field: &'static str,
        #[source]
        source: humantime::DurationError,
    },
}

/// Task scheduling settings (`[tasks]` table in the TOML file).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct TasksConfig {
    pub location: Location,
    pub queue: Queue,
    /// Delay before the mirror update, e.g. `"5s"`.
    pub mirror_delay: String,
    /// Delay before the CSV export, e.g. `"10s"`.
    pub export_delay: String,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            location: Location::default(),
            queue: Queue::default(),
            mirror_delay: humantime::format_duration(DEFAULT_MIRROR_DELAY).to_string(),
            export_delay: humantime::format_duration(DEFAULT_EXPORT_DELAY).to_string(),
        }
    }
}

/// Top-level user configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    #[serde(default)]
    pub tasks: TasksConfig,
}

impl UserConfig {
    /// Resolve the `[tasks]` table into service settings.
    pub fn to_service_settings(&self) -> Result<ServiceSettings, UserConfigError> {
        let parse = |field: &'static str, value: &str| {
            humantime::parse_duration(value)
                .map_err(|source| UserConfigError::Duration { field, source })
        };
        Ok(ServiceSettings {
            mirror_delay: parse("mirror_delay", &self.tasks.mirror_delay)?,
            export_delay: parse("export_delay", &self.tasks.export_delay)?,
            location: self.tasks.location,
            queue: self.tasks.queue,
        })
    }
}

/// `~/.item-service/config.toml`, honouring `ITEM_SERVICE_HOME`.
#[must_use]
pub fn user_config_path() -> PathBuf {
    service_home().join("config.toml")
}

/// Load a user configuration file. A missing file yields the defaults.
pub fn load_user_config_from(path: &Path) -> Result<UserConfig, UserConfigError> {
    if !path.exists() {
        debug!(
            "User config not found at {}; using defaults",
            path.display()
        );
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: UserConfig = toml::from_str(&content)?;
    debug!("Loaded user config from {}", path.display());
    Ok(config)
}

/// Service settings from a user config file.
///
/// Any problem with the file, whether unreadable, malformed, carrying an
/// unknown field or an invalid duration, is logged and the defaults are
/// used instead.
#[must_use]
pub fn service_settings_or_default(path: &Path) -> ServiceSettings {
    load_user_config_from(path)
        .and_then(|config| config.to_service_settings())
        .unwrap_or_else(|e| {
            warn!("Failed to load user config, using defaults: {e}");
            ServiceSettings::default()
        })
}

#[cfg(test)]
#[path = "user_config_tests.rs"]
mod tests;
