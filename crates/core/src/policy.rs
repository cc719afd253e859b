//! Persistence policy: which responses are worth keeping.
//!
//! A [`Policy`] is pure data. It answers one question — should this
//! response be written to the store — from two allow-sets and nothing
//! else. Expiry is carried here too so the decision engine has a single
//! value describing its caching behavior.

use std::collections::HashSet;
use std::time::Duration;

/// Policy construction errors.
///
/// Both allow-sets are required. There is deliberately no "allow
/// everything" default; callers must state what they cache.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("policy requires at least one allowed status code")]
    NoStatusCodes,

    #[error("policy requires at least one allowed method")]
    NoMethods,
}

/// Immutable persistence policy.
///
/// A response is persisted only when its status code AND its request
/// method are both in the allow-sets. `ttl` of `None` means entries
/// never expire.
#[derive(Debug, Clone)]
pub struct Policy {
    allowed_status_codes: HashSet<u16>,
    allowed_methods: HashSet<String>,
    ttl: Option<Duration>,
}

impl Policy {
    /// Build a policy from the two required allow-sets.
    ///
    /// Method names are normalized to uppercase. Returns an error if
    /// either set is empty.
    pub fn new(
        status_codes: impl IntoIterator<Item = u16>,
        methods: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, PolicyError> {
        let allowed_status_codes: HashSet<u16> = status_codes.into_iter().collect();
        let allowed_methods: HashSet<String> =
            methods.into_iter().map(|m| m.as_ref().to_ascii_uppercase()).collect();

        if allowed_status_codes.is_empty() {
            return Err(PolicyError::NoStatusCodes);
        }
        if allowed_methods.is_empty() {
            return Err(PolicyError::NoMethods);
        }

        Ok(Self { allowed_status_codes, allowed_methods, ttl: None })
    }

    /// Set the time-to-live applied to every entry saved under this policy.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Whether a response with this status code and request method is
    /// eligible for persistence. Both conditions must hold.
    pub fn should_persist(&self, status_code: u16, method: &str) -> bool {
        self.allowed_status_codes.contains(&status_code)
            && self.allowed_methods.contains(&method.to_ascii_uppercase())
    }

    /// TTL applied to saved entries, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}
