//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - either allow-set is empty (there is no "cache everything" default)
    /// - a status code is outside 100..=599
    /// - a method name is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_status_codes.is_empty() {
            return Err(ConfigError::Missing {
                field: "allowed_status_codes".into(),
                hint: "Set MEMENTO_ALLOWED_STATUS_CODES or list them in the config file".into(),
            });
        }
        if self.allowed_methods.is_empty() {
            return Err(ConfigError::Missing {
                field: "allowed_methods".into(),
                hint: "Set MEMENTO_ALLOWED_METHODS or list them in the config file".into(),
            });
        }

        for code in &self.allowed_status_codes {
            if *code < 100 || *code > 599 {
                return Err(ConfigError::Invalid {
                    field: "allowed_status_codes".into(),
                    reason: format!("{code} is not an HTTP status code"),
                });
            }
        }

        for method in &self.allowed_methods {
            if method.is_empty() {
                return Err(ConfigError::Invalid {
                    field: "allowed_methods".into(),
                    reason: "method name must not be empty".into(),
                });
            }
        }

        if self.ttl_secs == Some(0) {
            tracing::warn!("ttl_secs is 0; every entry expires on the first read after the save");
        }

        Ok(())
    }
}
