use super::init::{default_filter, output_layers};
use tracing_appender::rolling::RollingFileAppender;
use super::*;

#[test]
fn test_log_config_default() {
    let config = LogConfig::default();
    assert_eq!(config.log_level, Level::INFO);
    assert!(!config.json_format);
    assert!(config.log_dir.ends_with("logs"));
}

#[test]
fn test_default_log_dir_under_service_home() {
    assert_eq!(default_log_dir(), service_home().join("logs"));
}

#[test]
fn test_parse_rotation_hourly() {
    let debug = format!("{:?}", parse_rotation("hourly"));
    assert_eq!(debug, format!("{:?}", Rotation::HOURLY));
}

#[test]
fn test_parse_rotation_never_case_insensitive() {
    let debug = format!("{:?}", parse_rotation("NEVER"));
    assert_eq!(debug, format!("{:?}", Rotation::NEVER));
}

#[test]
fn test_parse_rotation_unknown_defaults_to_daily() {
    let weekly = format!("{:?}", parse_rotation("weekly"));
    assert_eq!(weekly, format!("{:?}", Rotation::DAILY));
}

#[test]
fn test_default_filter_targets_crate() {
    assert_eq!(default_filter(Level::DEBUG), "item_service=DEBUG");
}

#[test]
fn test_log_filename_constant() {
    assert_eq!(LOG_FILENAME, "item-service.log");
}

#[test]
fn test_output_layers_plain_and_json() {
    let dir = tempfile::tempdir().unwrap();
    for json in [false, true] {
        let file = RollingFileAppender::new(Rotation::NEVER, dir.path(), LOG_FILENAME);
        assert_eq!(output_layers(Level::INFO, json, file).len(), 2);
    }
}
