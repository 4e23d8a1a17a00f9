use crate::config::{DispatcherConfig, MACAROONS_ENABLED_ENV};
use crate::error::config::ConfigError;

use std::collections::HashMap;
use std::fs;

use tempfile::TempDir;

const CONFIG_FILE_NAME: &str = "dispatcher.toml";

fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

/// **VALUE**: Verifies that a missing config file yields defaults with auth enabled.
///
/// **WHY THIS MATTERS**: A fresh install has no config file. Defaulting to auth
/// disabled would send every call without the macaroon and the node would reject them.
#[test]
fn given_missing_file_when_loaded_then_defaults_enable_macaroons() {
    // GIVEN: An empty config directory
    let dir = TempDir::new().unwrap();

    // WHEN: Loading the file
    let config = DispatcherConfig::load_file(dir.path()).unwrap();

    // THEN: Defaults apply
    assert_eq!(config, DispatcherConfig::default());
    assert!(config.auth.macaroons_enabled);
    assert_eq!(config.version, 1);
}

/// **VALUE**: Verifies that the auth policy is read from TOML.
#[test]
fn given_file_disabling_macaroons_when_loaded_then_policy_is_disabled() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "version = 1\n\n[auth]\nmacaroons_enabled = false\n",
    )
    .unwrap();

    let config = DispatcherConfig::load_file(dir.path()).unwrap();

    assert!(!config.auth.macaroons_enabled);
}

/// **VALUE**: Verifies that omitted sections fall back to defaults.
#[test]
fn given_file_without_auth_section_when_loaded_then_auth_uses_default() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "version = 1\n").unwrap();

    let config = DispatcherConfig::load_file(dir.path()).unwrap();

    assert!(config.auth.macaroons_enabled);
}

/// **VALUE**: Verifies that a corrupted file is an error, not silently defaults.
///
/// **BUG THIS CATCHES**: Would catch a parse failure flipping the auth policy back to
/// its default without telling anyone.
#[test]
fn given_invalid_toml_when_loaded_then_returns_parse_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "[auth\nmacaroons_enabled = ").unwrap();

    let result = DispatcherConfig::load_file(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Verifies that the wrong value type is a parse error.
#[test]
fn given_non_boolean_policy_when_loaded_then_returns_parse_error() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[auth]\nmacaroons_enabled = \"maybe\"\n",
    )
    .unwrap();

    let result = DispatcherConfig::load_file(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Verifies that unsupported versions are rejected.
#[test]
fn given_future_version_when_loaded_then_returns_validation_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "version = 7\n").unwrap();

    let result = DispatcherConfig::load_file(dir.path());

    match result {
        Err(ConfigError::ValidationError { reason, .. }) => {
            assert!(reason.contains("Invalid version: 7"), "got: {reason}");
        }
        other => panic!("Expected ValidationError, got {other:?}"),
    }
}

/// **VALUE**: Verifies the accepted spellings of the env override.
#[test]
fn given_env_override_values_when_applied_then_policy_follows_value() {
    let cases = [
        ("false", false),
        ("0", false),
        ("OFF", false),
        ("no", false),
        ("true", true),
        ("1", true),
        (" yes ", true),
        ("On", true),
    ];

    for (value, expected) in cases {
        let mut config = DispatcherConfig::default();
        config.auth.macaroons_enabled = !expected;

        config
            .apply_overrides(lookup_from(&[(MACAROONS_ENABLED_ENV, value)]))
            .unwrap();

        assert_eq!(
            config.auth.macaroons_enabled, expected,
            "value '{value}' should give {expected}"
        );
    }
}

/// **VALUE**: Verifies that garbage in the override is an error naming the variable.
///
/// **BUG THIS CATCHES**: Would catch "fasle" being treated as "not false", silently
/// leaving authentication in whatever state the file had.
#[test]
fn given_unparseable_env_override_when_applied_then_returns_env_override_error() {
    let mut config = DispatcherConfig::default();

    let result = config.apply_overrides(lookup_from(&[(MACAROONS_ENABLED_ENV, "fasle")]));

    match result {
        Err(ConfigError::EnvOverride {
            variable, value, ..
        }) => {
            assert_eq!(variable, MACAROONS_ENABLED_ENV);
            assert_eq!(value, "fasle");
        }
        other => panic!("Expected EnvOverride, got {other:?}"),
    }
    assert!(config.auth.macaroons_enabled, "config must be left untouched");
}

/// **VALUE**: Verifies that unrelated variables leave the config alone.
#[test]
fn given_no_override_when_applied_then_config_unchanged() {
    let mut config = DispatcherConfig::default();

    config
        .apply_overrides(lookup_from(&[("NODE_BRIDGE_SOMETHING_ELSE", "false")]))
        .unwrap();

    assert_eq!(config, DispatcherConfig::default());
}

/// **VALUE**: Verifies the env variable name (documented for packagers).
#[test]
fn given_override_constant_when_inspected_then_uses_bridge_prefix() {
    assert_eq!(MACAROONS_ENABLED_ENV, "NODE_BRIDGE_MACAROONS_ENABLED");
}
