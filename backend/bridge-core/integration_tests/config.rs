use bridge_core::DispatcherConfig;
use bridge_core::config::MACAROONS_ENABLED_ENV;
use bridge_core::error::config::ConfigError;

use std::env;
use std::fs;

use serial_test::serial;
use tempfile::TempDir;

/// Sets an environment variable for the lifetime of the guard.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn set(name: &'static str, value: &str) -> Self {
        // SAFETY: every test touching the environment is #[serial].
        unsafe { env::set_var(name, value) };
        Self(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: see `EnvGuard::set`.
        unsafe { env::remove_var(self.0) };
    }
}

/// **VALUE**: Verifies that the process environment overrides the config file.
///
/// **WHY THIS MATTERS**: Developers run against regtest nodes with macaroons off.
/// They flip the policy with an env var instead of editing the shared config file.
#[test]
#[serial]
fn given_env_disables_macaroons_when_loaded_then_env_wins_over_file() {
    // GIVEN: File enables macaroons, environment disables them
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("dispatcher.toml"),
        "version = 1\n\n[auth]\nmacaroons_enabled = true\n",
    )
    .unwrap();
    let _guard = EnvGuard::set(MACAROONS_ENABLED_ENV, "off");

    // WHEN: Loading with overrides
    let config = DispatcherConfig::load(dir.path()).unwrap();

    // THEN: The environment value is applied
    assert!(!config.auth.macaroons_enabled);
}

/// **VALUE**: Verifies that an unset override leaves the file value alone.
#[test]
#[serial]
fn given_no_env_override_when_loaded_then_file_value_kept() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("dispatcher.toml"),
        "[auth]\nmacaroons_enabled = false\n",
    )
    .unwrap();
    // SAFETY: #[serial]
    unsafe { env::remove_var(MACAROONS_ENABLED_ENV) };

    let config = DispatcherConfig::load(dir.path()).unwrap();

    assert!(!config.auth.macaroons_enabled);
    assert_eq!(config.version, 1);
}

/// **VALUE**: Verifies that a garbage override is an error rather than a silent default.
///
/// **BUG THIS CATCHES**: Would catch `MACAROONS_ENABLED=flase` quietly enabling auth.
#[test]
#[serial]
fn given_invalid_env_override_when_loaded_then_returns_env_override_error() {
    let dir = TempDir::new().unwrap();
    let _guard = EnvGuard::set(MACAROONS_ENABLED_ENV, "flase");

    let result = DispatcherConfig::load(dir.path());

    match result {
        Err(ConfigError::EnvOverride { variable, value, .. }) => {
            assert_eq!(variable, MACAROONS_ENABLED_ENV);
            assert_eq!(value, "flase");
        }
        other => panic!("Expected EnvOverride, got {other:?}"),
    }
}

/// **VALUE**: Verifies that the default config directory is namespaced for the bridge.
#[test]
fn given_platform_config_dir_when_default_dir_requested_then_ends_with_app_name() {
    // Platforms without a config dir (bare containers) legitimately return an error.
    match DispatcherConfig::default_dir() {
        Ok(dir) => assert!(dir.ends_with("node-bridge"), "got: {}", dir.display()),
        Err(err) => assert!(matches!(err, ConfigError::DirectoryNotFound { .. })),
    }
}
