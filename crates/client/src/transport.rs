//! The decision engine: read-through, execute, gate, persist.

use std::sync::Arc;

use bytes::Bytes;
use memento_core::{Policy, ResponseStore};
use reqwest::Method;
use url::Url;

use crate::builder::CachedClientBuilder;
use crate::executor::Executor;
use crate::request::{Request, Response};
use crate::Error;

/// Cache-aside decorator over an [`Executor`].
///
/// Each call makes zero or one network call (zero on a hit) and zero or
/// one store write. The client holds no cache state of its own beyond the
/// store and policy it was built with, and is cheap to clone and share
/// across tasks; concurrency safety of storage access is the store
/// implementation's responsibility.
#[derive(Clone)]
pub struct CachedClient {
    pub(crate) executor: Arc<dyn Executor>,
    pub(crate) store: Arc<dyn ResponseStore>,
    pub(crate) policy: Policy,
}

impl CachedClient {
    /// Start building a client. Store and policy are required.
    pub fn builder() -> CachedClientBuilder {
        CachedClientBuilder::new()
    }

    /// Build a client from loaded configuration: SQLite store at the
    /// configured path, policy from the configured allow-sets, default
    /// executor.
    pub async fn from_config(config: &memento_core::AppConfig) -> Result<Self, Error> {
        CachedClientBuilder::from_config(config).await?.build()
    }

    /// Execute a request through the cache.
    ///
    /// On a hit the stored response is returned and no network call
    /// occurs. On a miss the request is delegated to the executor
    /// unmodified; the response is persisted only if the policy admits
    /// both its status code and the request method. A failed save is
    /// returned as `Error::Storage` and the fetched response is withheld;
    /// callers wanting best-effort caching treat that error as non-fatal.
    pub async fn execute(&self, request: Request) -> Result<Response, Error> {
        let identity = request.identity()?;

        if let Some(stored) = self.store.read(&identity).await? {
            tracing::debug!(identity = %identity, "cache hit");
            return Response::from_stored(request, stored);
        }
        tracing::debug!(identity = %identity, "cache miss");

        let response = self.executor.execute(&request).await?;

        let status = response.status().as_u16();
        if !self.policy.should_persist(status, identity.method()) {
            tracing::debug!(identity = %identity, status, "response not eligible for persistence");
            return Ok(response);
        }

        self.store
            .save(&identity, response.body(), status, self.policy.ttl())
            .await?;
        tracing::debug!(identity = %identity, status, "response persisted");

        Ok(response)
    }

    /// GET convenience wrapper around [`execute`](Self::execute).
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        self.execute(Request::new(Method::GET, parse_url(url)?)).await
    }

    /// HEAD convenience wrapper.
    pub async fn head(&self, url: &str) -> Result<Response, Error> {
        self.execute(Request::new(Method::HEAD, parse_url(url)?)).await
    }

    /// DELETE convenience wrapper.
    pub async fn delete(&self, url: &str) -> Result<Response, Error> {
        self.execute(Request::new(Method::DELETE, parse_url(url)?)).await
    }

    /// POST convenience wrapper.
    pub async fn post(&self, url: &str, body: impl Into<Bytes>) -> Result<Response, Error> {
        self.execute(Request::new(Method::POST, parse_url(url)?).with_body(body)).await
    }

    /// PUT convenience wrapper.
    pub async fn put(&self, url: &str, body: impl Into<Bytes>) -> Result<Response, Error> {
        self.execute(Request::new(Method::PUT, parse_url(url)?).with_body(body)).await
    }

    /// PATCH convenience wrapper.
    pub async fn patch(&self, url: &str, body: impl Into<Bytes>) -> Result<Response, Error> {
        self.execute(Request::new(Method::PATCH, parse_url(url)?).with_body(body)).await
    }
}

fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use memento_core::{RequestIdentity, SqliteStore, StoredResponse};
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Executor double that serves a scripted queue of responses and
    /// counts how often the network is reached.
    struct ScriptedExecutor {
        responses: Mutex<VecDeque<(u16, &'static [u8])>>,
        calls: AtomicUsize,
    }

    impl ScriptedExecutor {
        fn new(responses: impl IntoIterator<Item = (u16, &'static [u8])>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Executor for ScriptedExecutor {
        async fn execute(&self, request: &Request) -> Result<Response, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (status, body) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected network call");
            Ok(Response::new(
                request.clone(),
                StatusCode::from_u16(status).unwrap(),
                Bytes::from_static(body),
            ))
        }
    }

    /// Store double whose save always fails.
    struct FailingStore;

    #[async_trait]
    impl ResponseStore for FailingStore {
        async fn save(
            &self,
            _identity: &RequestIdentity,
            _body: &[u8],
            _status: u16,
            _ttl: Option<Duration>,
        ) -> Result<(), memento_core::Error> {
            Err(memento_core::Error::Database(tokio_rusqlite::Error::ConnectionClosed))
        }

        async fn read(&self, _identity: &RequestIdentity) -> Result<Option<StoredResponse>, memento_core::Error> {
            Ok(None)
        }
    }

    /// Store double whose read always fails.
    struct UnreadableStore;

    #[async_trait]
    impl ResponseStore for UnreadableStore {
        async fn save(
            &self,
            _identity: &RequestIdentity,
            _body: &[u8],
            _status: u16,
            _ttl: Option<Duration>,
        ) -> Result<(), memento_core::Error> {
            Ok(())
        }

        async fn read(&self, _identity: &RequestIdentity) -> Result<Option<StoredResponse>, memento_core::Error> {
            Err(memento_core::Error::Database(tokio_rusqlite::Error::ConnectionClosed))
        }
    }

    async fn client_with(
        executor: Arc<ScriptedExecutor>,
        policy: Policy,
    ) -> (CachedClient, Arc<ScriptedExecutor>) {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let client = CachedClient::builder()
            .store(store)
            .policy(policy)
            .shared_executor(executor.clone())
            .build()
            .unwrap();
        (client, executor)
    }

    fn get_policy() -> Policy {
        Policy::new([200], ["GET"]).unwrap().with_ttl(Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_miss_then_hit_avoids_network() {
        let executor = ScriptedExecutor::new([(200, b"hello".as_slice())]);
        let (client, executor) = client_with(executor, get_policy()).await;

        let first = client.get("https://a.test/x").await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.text(), "hello");
        assert_eq!(executor.calls(), 1);

        let second = client.get("https://a.test/x").await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(second.text(), "hello");
        assert_eq!(executor.calls(), 1);
    }

    #[tokio::test]
    async fn test_hit_is_byte_exact() {
        let body: &[u8] = &[0x00, 0xfe, 0x01, 0x00, 0x7f];
        let executor = ScriptedExecutor::new([(200, body)]);
        let (client, _) = client_with(executor, get_policy()).await;

        let miss = client.get("https://a.test/bin").await.unwrap();
        let hit = client.get("https://a.test/bin").await.unwrap();
        assert_eq!(miss.body(), hit.body());
        assert_eq!(hit.body().as_ref(), body);
    }

    #[tokio::test]
    async fn test_disallowed_status_not_persisted() {
        let executor = ScriptedExecutor::new([(404, b"gone".as_slice()), (404, b"gone".as_slice())]);
        let (client, executor) = client_with(executor, get_policy()).await;

        let first = client.get("https://a.test/missing").await.unwrap();
        assert_eq!(first.status(), StatusCode::NOT_FOUND);
        assert_eq!(first.text(), "gone");

        // No entry was created, so the second call reaches the network again.
        let second = client.get("https://a.test/missing").await.unwrap();
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
        assert_eq!(executor.calls(), 2);
    }

    #[tokio::test]
    async fn test_disallowed_method_not_persisted() {
        let executor = ScriptedExecutor::new([(200, b"ok".as_slice()), (200, b"ok".as_slice())]);
        let (client, executor) = client_with(executor, get_policy()).await;

        client.post("https://a.test/submit", "payload").await.unwrap();
        client.post("https://a.test/submit", "payload").await.unwrap();
        assert_eq!(executor.calls(), 2);
    }

    #[tokio::test]
    async fn test_distinct_queries_are_distinct_entries() {
        let executor = ScriptedExecutor::new([(200, b"page1".as_slice()), (200, b"page2".as_slice())]);
        let (client, executor) = client_with(executor, get_policy()).await;

        let one = client.get("https://a.test/list?page=1").await.unwrap();
        let two = client.get("https://a.test/list?page=2").await.unwrap();
        assert_eq!(one.text(), "page1");
        assert_eq!(two.text(), "page2");
        assert_eq!(executor.calls(), 2);

        // Both entries hit independently.
        assert_eq!(client.get("https://a.test/list?page=1").await.unwrap().text(), "page1");
        assert_eq!(client.get("https://a.test/list?page=2").await.unwrap().text(), "page2");
        assert_eq!(executor.calls(), 2);
    }

    #[tokio::test]
    async fn test_save_failure_surfaces_as_storage_error() {
        let executor = ScriptedExecutor::new([(200, b"hello".as_slice())]);
        let client = CachedClient::builder()
            .store(FailingStore)
            .policy(get_policy())
            .shared_executor(executor.clone())
            .build()
            .unwrap();

        let result = client.get("https://a.test/x").await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(executor.calls(), 1);
    }

    #[tokio::test]
    async fn test_read_failure_surfaces_before_network() {
        let executor = ScriptedExecutor::new([]);
        let client = CachedClient::builder()
            .store(UnreadableStore)
            .policy(get_policy())
            .shared_executor(executor.clone())
            .build()
            .unwrap();

        let result = client.get("https://a.test/x").await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(executor.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_error_propagates_untouched_store() {
        struct BrokenExecutor;

        #[async_trait]
        impl Executor for BrokenExecutor {
            async fn execute(&self, _request: &Request) -> Result<Response, Error> {
                Err(Error::InvalidUrl("connection refused".into()))
            }
        }

        let store = SqliteStore::open_in_memory().await.unwrap();
        let client = CachedClient::builder()
            .store(store.clone())
            .policy(get_policy())
            .executor(BrokenExecutor)
            .build()
            .unwrap();

        assert!(client.get("https://a.test/x").await.is_err());

        // Failure left no entry behind.
        let identity = Request::new(Method::GET, Url::parse("https://a.test/x").unwrap())
            .identity()
            .unwrap();
        assert!(store.read(&identity).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fresh_response_overwrites_expired_entry() {
        let executor = ScriptedExecutor::new([(200, b"hello".as_slice()), (200, b"world".as_slice())]);
        let store = SqliteStore::open_in_memory().await.unwrap();
        let client = CachedClient::builder()
            .store(store.clone())
            .policy(get_policy())
            .shared_executor(executor.clone())
            .build()
            .unwrap();

        assert_eq!(client.get("https://a.test/x").await.unwrap().text(), "hello");

        // Expire the entry in place, as if the TTL elapsed.
        let identity = Request::new(Method::GET, Url::parse("https://a.test/x").unwrap())
            .identity()
            .unwrap();
        store.save(&identity, b"hello", 200, Some(Duration::ZERO)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(client.get("https://a.test/x").await.unwrap().text(), "world");
        assert_eq!(executor.calls(), 2);

        // The fresh response replaced the stale row.
        assert_eq!(client.get("https://a.test/x").await.unwrap().text(), "world");
        assert_eq!(executor.calls(), 2);
    }
}
