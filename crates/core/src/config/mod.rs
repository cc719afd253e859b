//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MEMENTO_*)
//! 2. TOML config file (if MEMENTO_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::policy::{Policy, PolicyError};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MEMENTO_*)
/// 2. TOML config file (if MEMENTO_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache database.
    ///
    /// Set via MEMENTO_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Status codes eligible for persistence.
    ///
    /// Set via MEMENTO_ALLOWED_STATUS_CODES environment variable.
    #[serde(default = "default_allowed_status_codes")]
    pub allowed_status_codes: Vec<u16>,

    /// Request methods eligible for persistence.
    ///
    /// Set via MEMENTO_ALLOWED_METHODS environment variable.
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,

    /// Entry time-to-live in seconds. Absent means entries never expire.
    ///
    /// Set via MEMENTO_TTL_SECS environment variable.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./memento-cache.sqlite")
}

fn default_allowed_status_codes() -> Vec<u16> {
    vec![200]
}

fn default_allowed_methods() -> Vec<String> {
    vec!["GET".into()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            allowed_status_codes: default_allowed_status_codes(),
            allowed_methods: default_allowed_methods(),
            ttl_secs: None,
        }
    }
}

impl AppConfig {
    /// TTL as Duration for use with the policy and store.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `MEMENTO_`
    /// 2. TOML file from `MEMENTO_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MEMENTO_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MEMENTO_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Build the persistence [`Policy`] described by this configuration.
    pub fn policy(&self) -> Result<Policy, ConfigError> {
        let policy = Policy::new(self.allowed_status_codes.iter().copied(), self.allowed_methods.iter())
            .map_err(|e| match e {
                PolicyError::NoStatusCodes => ConfigError::Missing {
                    field: "allowed_status_codes".into(),
                    hint: "Set MEMENTO_ALLOWED_STATUS_CODES or list them in the config file".into(),
                },
                PolicyError::NoMethods => ConfigError::Missing {
                    field: "allowed_methods".into(),
                    hint: "Set MEMENTO_ALLOWED_METHODS or list them in the config file".into(),
                },
            })?;

        Ok(match self.ttl() {
            Some(ttl) => policy.with_ttl(ttl),
            None => policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./memento-cache.sqlite"));
        assert_eq!(config.allowed_status_codes, vec![200]);
        assert_eq!(config.allowed_methods, vec!["GET".to_string()]);
        assert!(config.ttl_secs.is_none());
    }

    #[test]
    fn test_ttl_duration() {
        let config = AppConfig { ttl_secs: Some(3600), ..Default::default() };
        assert_eq!(config.ttl(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_policy_from_default_config() {
        let policy = AppConfig::default().policy().unwrap();
        assert!(policy.should_persist(200, "GET"));
        assert!(!policy.should_persist(200, "POST"));
        assert!(policy.ttl().is_none());
    }

    #[test]
    fn test_policy_carries_ttl() {
        let config = AppConfig { ttl_secs: Some(60), ..Default::default() };
        let policy = config.policy().unwrap();
        assert_eq!(policy.ttl(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_policy_missing_status_codes() {
        let config = AppConfig { allowed_status_codes: vec![], ..Default::default() };
        let result = config.policy();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "allowed_status_codes"));
    }
}
