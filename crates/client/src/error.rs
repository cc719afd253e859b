//! Error taxonomy for the caching decorator.
//!
//! A cache miss is not an error: it is the expected steady-state path and
//! shows up as `Ok(None)` at the store, never here.

/// Errors surfaced by [`crate::CachedClient`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying executor failed. Propagated verbatim, never
    /// retried by this layer.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// The store could not complete a save or read.
    #[error("cache storage failed: {0}")]
    Storage(#[from] memento_core::Error),

    /// A required field was missing at build time.
    #[error("construction failed: {0}")]
    Construction(String),

    /// The request URL cannot be keyed (unparseable, or no host).
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Configuration could not be turned into a store and policy.
    #[error("configuration error: {0}")]
    Config(#[from] memento_core::config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_display() {
        let err = Error::Construction("a response store is required".into());
        assert!(err.to_string().contains("construction failed"));
        assert!(err.to_string().contains("response store"));
    }

    #[test]
    fn test_storage_wraps_core_error() {
        let err: Error = memento_core::Error::MigrationFailed("boom".into()).into();
        assert!(matches!(err, Error::Storage(_)));
    }
}
