//! Request and response model for the decorator.
//!
//! A [`Response`] carries its body as a replayable [`Bytes`] buffer and a
//! back-reference to the originating request, so reading the body for
//! persistence never starves the caller's read.

use crate::Error;
use bytes::Bytes;
use memento_core::{RequestIdentity, StoredResponse};
use reqwest::{Method, StatusCode};
use url::Url;

/// An outgoing HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    body: Option<Bytes>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, body: None }
    }

    /// Attach a request body. The body does not participate in the cache
    /// key; see [`RequestIdentity`].
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Derive the cache identity: method + host + path + query.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` for URLs without a host (nothing to
    /// key the entry on).
    pub fn identity(&self) -> Result<RequestIdentity, Error> {
        let host = self
            .url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(format!("{} has no host", self.url)))?;

        Ok(RequestIdentity::new(
            self.method.as_str(),
            host,
            self.url.path(),
            self.url.query(),
        ))
    }
}

/// An HTTP response as seen by callers of the decorator.
///
/// The status code is passed through untouched whether the response came
/// from the store or from the network.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    body: Bytes,
    request: Request,
}

impl Response {
    pub fn new(request: Request, status: StatusCode, body: Bytes) -> Self {
        Self { status, body, request }
    }

    /// Rebuild a response from a stored entry on a cache hit.
    pub(crate) fn from_stored(request: Request, stored: StoredResponse) -> Result<Self, Error> {
        let status = StatusCode::from_u16(stored.status)
            .map_err(|_| memento_core::Error::CorruptEntry(format!("status code {}", stored.status)))?;

        Ok(Self { status, body: Bytes::from(stored.body), request })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response body. Cloning is cheap; the bytes are shared.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The request this response answers.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
