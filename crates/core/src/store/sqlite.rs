//! SQLite-backed response store.
//!
//! One row per request identity. Saves are upserts (last write wins) and
//! expiry is lazy: an expired row reads as absent but stays on disk until
//! a later save overwrites it.

use super::connection::StoreDb;
use super::identity::RequestIdentity;
use super::{ResponseStore, StoredResponse};
use crate::Error;
use std::path::Path;
use std::time::Duration;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Reference [`ResponseStore`] implementation backed by a single SQLite table.
///
/// The handle is cheap to clone; all clones share one connection running
/// statements on a background thread.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    db: StoreDb,
}

impl SqliteStore {
    /// Open (or create) the backing database file and ensure the schema
    /// exists. Missing parent directories are created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(Self { db: StoreDb::open(path).await? })
    }

    /// In-memory store for tests.
    pub async fn open_in_memory() -> Result<Self, Error> {
        Ok(Self { db: StoreDb::open_in_memory().await? })
    }

    fn absolute_expiry(ttl: Option<Duration>) -> Option<i64> {
        ttl.map(|ttl| chrono::Utc::now().timestamp() + ttl.as_secs() as i64)
    }
}

#[async_trait::async_trait]
impl ResponseStore for SqliteStore {
    async fn save(
        &self,
        identity: &RequestIdentity,
        body: &[u8],
        status: u16,
        ttl: Option<Duration>,
    ) -> Result<(), Error> {
        let key = identity.key();
        let method = identity.method().to_string();
        let body = body.to_vec();
        let expiry = Self::absolute_expiry(ttl);

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO responses (
                        request_identity, request_method, response_body, status_code, expiry_time
                    ) VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(request_identity) DO UPDATE SET
                        request_method = excluded.request_method,
                        response_body = excluded.response_body,
                        status_code = excluded.status_code,
                        expiry_time = excluded.expiry_time",
                    params![key, method, body, status as i64, expiry],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn read(&self, identity: &RequestIdentity) -> Result<Option<StoredResponse>, Error> {
        let key = identity.key();
        let now = chrono::Utc::now().timestamp();

        self.db
            .conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let result = conn.query_row(
                    "SELECT response_body, status_code, expiry_time
                     FROM responses WHERE request_identity = ?1",
                    params![key],
                    |row| {
                        Ok((
                            row.get::<_, Vec<u8>>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, Option<i64>>(2)?,
                        ))
                    },
                );

                let (body, status, expiry) = match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                // Lazy expiry: the row stays on disk, the read treats it
                // as never stored.
                if let Some(expiry) = expiry
                    && now > expiry
                {
                    return Ok(None);
                }

                let status = u16::try_from(status)
                    .map_err(|_| Error::CorruptEntry(format!("status code {status}")))?;

                Ok(Some(StoredResponse { body, status }))
            })
            .await
            .map_err(Error::from)
    }
}
