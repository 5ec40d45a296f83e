mod init;

pub use init::{init_logging, parse_rotation};

use crate::utils::service_home;
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::rolling::Rotation;

/// Log filename used by the service.
pub const LOG_FILENAME: &str = "item-service.log";

/// Configuration for the logging system.
#[derive(Debug)]
pub struct LogConfig {
    pub log_dir: PathBuf,
    /// Level used when `RUST_LOG` is not set.
    pub log_level: Level,
    pub json_format: bool,
    pub rotation: Rotation,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_level: Level::INFO,
            json_format: false,
            rotation: Rotation::DAILY,
        }
    }
}

/// `~/.item-service/logs`, honouring `ITEM_SERVICE_HOME`.
#[must_use]
pub fn default_log_dir() -> PathBuf {
    service_home().join("logs")
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod logging_tests;
