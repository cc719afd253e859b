//! Fail-fast construction of [`CachedClient`].
//!
//! The builder accumulates optional overrides over the two required
//! fields (store, policy) and validates once at `build`. There is no
//! implicit default store or "cache everything" fallback; a missing
//! required field is a descriptive construction error, never a panic in
//! request handling.

use std::sync::Arc;

use memento_core::{AppConfig, Policy, ResponseStore, SqliteStore};

use crate::executor::{Executor, ReqwestExecutor};
use crate::transport::CachedClient;
use crate::Error;

/// Builder for [`CachedClient`].
#[derive(Default)]
pub struct CachedClientBuilder {
    store: Option<Arc<dyn ResponseStore>>,
    policy: Option<Policy>,
    executor: Option<Arc<dyn Executor>>,
}

impl CachedClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder from loaded configuration: opens the SQLite
    /// store at the configured path and derives the policy from the
    /// configured allow-sets. The executor can still be overridden.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let store = SqliteStore::open(&config.db_path).await?;
        Ok(Self::new().store(store).policy(config.policy()?))
    }

    /// Set the response store (required).
    pub fn store(mut self, store: impl ResponseStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set an already-shared response store (required).
    pub fn shared_store(mut self, store: Arc<dyn ResponseStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the persistence policy (required).
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Override the underlying executor. Defaults to [`ReqwestExecutor`].
    pub fn executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Override the underlying executor with a shared instance.
    pub fn shared_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Validate and build the client.
    ///
    /// # Errors
    ///
    /// Returns `Error::Construction` when the store or policy is missing.
    pub fn build(self) -> Result<CachedClient, Error> {
        let store = self
            .store
            .ok_or_else(|| Error::Construction("a response store is required".into()))?;
        let policy = self
            .policy
            .ok_or_else(|| Error::Construction("a persistence policy is required".into()))?;
        let executor = match self.executor {
            Some(executor) => executor,
            None => Arc::new(ReqwestExecutor::new()?),
        };

        Ok(CachedClient { executor, store, policy })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_requires_store() {
        let result = CachedClientBuilder::new()
            .policy(Policy::new([200], ["GET"]).unwrap())
            .build();
        assert!(matches!(result, Err(Error::Construction(msg)) if msg.contains("store")));
    }

    #[tokio::test]
    async fn test_build_requires_policy() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let result = CachedClientBuilder::new().store(store).build();
        assert!(matches!(result, Err(Error::Construction(msg)) if msg.contains("policy")));
    }

    #[tokio::test]
    async fn test_build_defaults_executor() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let result = CachedClientBuilder::new()
            .store(store)
            .policy(Policy::new([200], ["GET"]).unwrap())
            .build();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_from_config_opens_store_and_policy() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            db_path: dir.path().join("cache.sqlite"),
            ..Default::default()
        };

        let client = CachedClientBuilder::from_config(&config).await.unwrap().build().unwrap();
        assert!(client.policy.should_persist(200, "GET"));
        assert!(!client.policy.should_persist(500, "GET"));
        assert!(config.db_path.exists());
    }
}
