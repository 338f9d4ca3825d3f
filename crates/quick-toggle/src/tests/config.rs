use crate::config::{Config, DEFAULT_CONTROL_ADDR, DEFAULT_REFRESH_INTERVAL_MS};

use std::time::Duration;

use quick_toggle_core::Labels;

/// WHAT: An empty document yields the default configuration
/// WHY: First-run and hand-trimmed files must still start the widget
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_document_when_parsing_then_defaults_used() {
    // Given: No settings at all
    let contents = "";

    // When: Parsing
    let config = Config::from_toml(contents).unwrap();

    // Then: Every section carries its defaults
    assert_eq!(config, Config::default());
    assert_eq!(config.schedule.refresh_interval_ms, DEFAULT_REFRESH_INTERVAL_MS);
    assert_eq!(config.service.control_addr, DEFAULT_CONTROL_ADDR);
    assert_eq!(config.labels, Labels::default());
    assert!(config.validate().is_ok());
}

/// WHAT: Partial sections override only the keys they name
/// WHY: Users edit one value without restating the rest
#[test]
#[allow(clippy::unwrap_used)]
fn given_partial_sections_when_parsing_then_only_named_keys_change() {
    // Given: A faster refresh and a renamed status label
    let contents = r#"
        [schedule]
        refresh_interval_ms = 3000

        [labels]
        status_inactive = "Off"
    "#;

    // When: Parsing and deriving scheduler settings
    let config = Config::from_toml(contents).unwrap();
    let scheduler = config.scheduler_config();

    // Then: Named keys changed, the rest kept defaults
    assert_eq!(scheduler.refresh_interval, Duration::from_secs(3));
    assert_eq!(scheduler.bind_timeout, Duration::from_millis(2000));
    assert_eq!(scheduler.toggle_grace, Duration::from_millis(500));
    assert_eq!(scheduler.labels.status_inactive, "Off");
    assert_eq!(scheduler.labels.status_active, Labels::default().status_active);
}

/// WHAT: Zero durations are rejected
/// WHY: A zero deadline would fail every call; a zero interval would spin
#[test]
#[allow(clippy::unwrap_used)]
fn given_zero_bind_timeout_when_validating_then_error() {
    // Given: A zero bind timeout
    let config = Config::from_toml("[schedule]\nbind_timeout_ms = 0\n").unwrap();

    // When: Validating
    let result = config.validate();

    // Then: Rejected with the offending key named
    let message = result.unwrap_err().to_string();
    assert!(message.contains("schedule.bind_timeout_ms"));
}

/// WHAT: A blank control address is rejected
/// WHY: Nothing could be reached and every refresh would fall back
#[test]
#[allow(clippy::unwrap_used)]
fn given_blank_control_addr_when_validating_then_error() {
    // Given: A whitespace-only address
    let config = Config::from_toml("[service]\ncontrol_addr = \"  \"\n").unwrap();

    // When/Then: Validation fails
    assert!(config.validate().is_err());
}

/// WHAT: Unparseable TOML is a configuration error
/// WHY: A broken file must be reported, not silently replaced
#[test]
fn given_invalid_toml_when_parsing_then_config_error() {
    // Given: A truncated table header
    let contents = "[schedule";

    // When: Parsing
    let result = Config::from_toml(contents);

    // Then: ConfigError
    assert!(matches!(result, Err(crate::AppError::ConfigError { .. })));
}
