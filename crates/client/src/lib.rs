//! Cache-aside decorator for outgoing HTTP requests.
//!
//! [`CachedClient`] intercepts a request, returns a previously stored
//! response when one is valid, and otherwise executes the request through
//! an underlying [`Executor`] and conditionally persists the result for
//! future reuse. Storage and policy come from `memento-core` and are
//! injected at construction; there are no process-wide defaults.

pub mod builder;
pub mod error;
pub mod executor;
pub mod request;
pub mod transport;

pub use builder::CachedClientBuilder;
pub use error::Error;
pub use executor::{Executor, ReqwestExecutor};
pub use request::{Request, Response};
pub use transport::CachedClient;

pub use memento_core::{AppConfig, Policy, RequestIdentity, ResponseStore, SqliteStore, StoredResponse};
