//! Unified error types for memento storage.

use tokio_rusqlite::rusqlite;

/// Errors surfaced by the store layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database operation failed.
    #[error("storage error: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("storage error: migration failed: {0}")]
    MigrationFailed(String),

    /// Filesystem preparation for the backing file failed.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row held a value outside the HTTP domain (e.g. an
    /// out-of-range status code).
    #[error("storage error: corrupt entry: {0}")]
    CorruptEntry(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MigrationFailed("bad batch".to_string());
        assert!(err.to_string().contains("migration failed"));
        assert!(err.to_string().contains("bad batch"));
    }

    #[test]
    fn test_connection_closed_maps_to_database() {
        let err: Error = tokio_rusqlite::Error::<Error>::ConnectionClosed.into();
        assert!(matches!(err, Error::Database(_)));
    }
}
