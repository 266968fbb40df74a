//! # strata-config
//!
//! Layered configuration loading for Strata using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`STRATA_*` prefix, `__` as separator)
//! 2. Project-level `.strata/config.toml`
//! 3. User-level `~/.config/strata/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `STRATA_DATABASE__PATH` -> `database.path`,
//! `STRATA_GENERAL__DEFAULT_LIMIT` -> `general.default_limit`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use strata_config::StrataConfig;
//!
//! let config = StrataConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! println!("database: {}", config.database.path);
//! ```

mod database;
mod error;
mod general;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StrataConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl StrataConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".strata/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("STRATA_").split("__"))
    }

    /// Reject values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty database path or a
    /// zero list limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.general.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.default_limit".into(),
                reason: "must be greater than 0".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("strata").join("config.toml"))
    }

    /// Load `.env` from the workspace root, falling back to the current dir.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = StrataConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.default_limit, 50);
        assert!(config.database.foreign_keys);
    }

    #[test]
    fn zero_limit_rejected() {
        let mut config = StrataConfig::default();
        config.general.default_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("general.default_limit"));
    }

    #[test]
    fn empty_path_rejected() {
        let mut config = StrataConfig::default();
        config.database.path = "  ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "database.path"
        ));
    }
}
