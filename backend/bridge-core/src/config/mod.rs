//! Dispatcher configuration.
//!
//! Loaded from `{config_dir}/dispatcher.toml`, then overridden by environment
//! variables (optionally sourced from a `.env` file). A missing file means
//! defaults; a file that exists but cannot be read or parsed is an error.

use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::env;
use std::panic::Location;
use std::path::{Path, PathBuf};

use const_format::concatcp;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "dispatcher.toml";
const CONFIG_VERSION: u32 = 1;
const APP_DIR_NAME: &str = "node-bridge";
const ENV_PREFIX: &str = "NODE_BRIDGE_";

/// Overrides `auth.macaroons_enabled` (`true`/`false`/`1`/`0`/`yes`/`no`/`on`/`off`).
pub const MACAROONS_ENABLED_ENV: &str = concatcp!(ENV_PREFIX, "MACAROONS_ENABLED");

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Attach the backend credential to every call.
    #[serde(default = "default_macaroons_enabled")]
    pub macaroons_enabled: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            macaroons_enabled: default_macaroons_enabled(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            auth: AuthConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_macaroons_enabled() -> bool {
    true
}

// ============================================
// IMPLEMENTATION
// ============================================

impl DispatcherConfig {
    /// Platform config directory for the bridge (e.g. `~/.config/node-bridge`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DirectoryNotFound`] if the platform has no
    /// config directory.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| ConfigError::DirectoryNotFound {
                location: ErrorLocation::from(Location::caller()),
                reason: "no platform config directory".to_string(),
            })
    }

    /// Load from `{config_dir}/dispatcher.toml` and apply environment overrides.
    ///
    /// A `.env` file in the working directory is loaded first, if present.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        load_dotenv();

        let mut config = Self::load_file(config_dir)?;
        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `{config_dir}/dispatcher.toml` only.
    ///
    /// # Returns
    ///
    /// Defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but is unreadable, is not
    /// valid TOML, or fails validation.
    pub fn load_file(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: DispatcherConfig = toml::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config TOML: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Apply overrides looked up through `lookup` (normally `env::var`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvOverride`] if a variable is set to a value
    /// that cannot be interpreted.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(MACAROONS_ENABLED_ENV) {
            let enabled = parse_flag(&value).ok_or_else(|| ConfigError::EnvOverride {
                location: ErrorLocation::from(Location::caller()),
                variable: MACAROONS_ENABLED_ENV,
                value: value.clone(),
            })?;

            info!("{MACAROONS_ENABLED_ENV} overrides macaroons_enabled to {enabled}");
            self.auth.macaroons_enabled = enabled;
        }

        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load `.env` from the working directory (non-fatal if missing).
fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded .env from: {:?}", path),
        Err(e) if e.not_found() => debug!("No .env file found - using process environment"),
        Err(e) => warn!("Failed to parse .env: {}", e),
    }
}
