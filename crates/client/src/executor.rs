//! The request-executor capability.
//!
//! Everything below the decorator — DNS, TLS, connection pooling,
//! socket-level retries — lives behind [`Executor`]. The decorator only
//! asks it to run a request and hand back a fully buffered response.

use crate::request::{Request, Response};
use crate::Error;
use async_trait::async_trait;

/// Executes a request against the live upstream.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run the request and return the response with its body fully
    /// buffered. Implementations must drain the network stream exactly
    /// once so the returned body is independently replayable.
    async fn execute(&self, request: &Request) -> Result<Response, Error>;
}

/// Default [`Executor`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    http: reqwest::Client,
}

impl ReqwestExecutor {
    /// Build an executor with rustls and transparent decompression.
    pub fn new() -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        Ok(Self { http })
    }

    /// Wrap an already-configured reqwest client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Executor for ReqwestExecutor {
    async fn execute(&self, request: &Request) -> Result<Response, Error> {
        let mut outgoing = self.http.request(request.method().clone(), request.url().clone());
        if let Some(body) = request.body() {
            outgoing = outgoing.body(body.clone());
        }

        let response = outgoing.send().await?;
        let status = response.status();

        // Drain the network stream once. The Bytes buffer is what both
        // the store and the caller read from here on.
        let body = response.bytes().await?;

        tracing::debug!(url = %request.url(), status = status.as_u16(), bytes = body.len(), "executed upstream request");

        Ok(Response::new(request.clone(), status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_builds() {
        let executor = ReqwestExecutor::new();
        assert!(executor.is_ok());
    }

    #[test]
    fn test_with_client() {
        let executor = ReqwestExecutor::with_client(reqwest::Client::new());
        let _trait_object: &dyn Executor = &executor;
    }
}
