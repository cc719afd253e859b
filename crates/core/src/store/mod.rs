//! Persistent response storage.
//!
//! This module defines the [`ResponseStore`] contract the decorator
//! depends on, plus the SQLite reference implementation:
//!
//! - Keyed by request identity (host + path + query + method)
//! - Upsert save semantics, last write wins
//! - Lazy expiry: stale rows read as absent but stay on disk
//! - Async access via tokio-rusqlite

pub mod connection;
pub mod identity;
pub mod migrations;
pub mod sqlite;

pub use crate::Error;
pub use connection::StoreDb;
pub use identity::RequestIdentity;
pub use sqlite::SqliteStore;

use std::time::Duration;

/// A previously persisted response, byte-exact as saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub body: Vec<u8>,
    pub status: u16,
}

/// Contract for durably saving and retrieving responses by request identity.
///
/// `read` returning `Ok(None)` is the distinguished "not found" outcome;
/// an expired entry reads as `Ok(None)` too, never as an error, so the
/// caller's miss path is uniform. `save` is an upsert: saving twice under
/// the same identity leaves the newer value, applied atomically.
///
/// Both operations abort result delivery when the caller drops the
/// returned future.
#[async_trait::async_trait]
pub trait ResponseStore: Send + Sync {
    /// Persist a response under the given identity, replacing any
    /// existing entry. `ttl` of `None` means the entry never expires.
    async fn save(
        &self,
        identity: &RequestIdentity,
        body: &[u8],
        status: u16,
        ttl: Option<Duration>,
    ) -> Result<(), Error>;

    /// Retrieve the stored response for an identity, or `None` when no
    /// entry exists or the entry has expired.
    async fn read(&self, identity: &RequestIdentity) -> Result<Option<StoredResponse>, Error>;
}
