//! Cache key derivation from request parts.

use std::fmt;

/// Identity of an outgoing request for caching purposes.
///
/// Two requests with the same method, host, path, and query are "the
/// same request" and share one stored entry. The request body is
/// deliberately not part of the identity: body-inclusive keys are
/// unbounded and force a body drain on every lookup. Callers for whom
/// distinct payloads to the same URL must not collide should keep
/// non-idempotent methods out of the policy's allowed set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestIdentity {
    method: String,
    host: String,
    path_and_query: String,
}

impl RequestIdentity {
    /// Derive an identity from request parts.
    ///
    /// The method is normalized to uppercase; host, path, and query are
    /// taken as given (callers pass already-canonicalized URL parts).
    pub fn new(method: &str, host: &str, path: &str, query: Option<&str>) -> Self {
        let path_and_query = match query {
            Some(q) => format!("{path}?{q}"),
            None => path.to_string(),
        };

        Self {
            method: method.to_ascii_uppercase(),
            host: host.to_string(),
            path_and_query,
        }
    }

    /// Canonical storage key: `{host}{path}?{query}#{METHOD}`.
    pub fn key(&self) -> String {
        format!("{}{}#{}", self.host, self.path_and_query, self.method)
    }

    /// Uppercase request method.
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.method, self.host, self.path_and_query)
    }
}
