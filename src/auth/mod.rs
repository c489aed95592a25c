//! Authentication against the store service
//!
//! Supports a pre-issued bearer token or Azure AD client credentials,
//! both read from the environment.

mod azure;

pub use azure::{
    fetch_access_token, get_store_auth, test_store_auth, StoreAuthConfig, DEFAULT_AUTHORITY,
    GRAPH_RESOURCE, SERVICE_RESOURCE,
};

use std::time::{Duration, Instant};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Pre-issued token from `STORE_ACCESS_TOKEN`
    StaticToken,
    /// Client credentials from environment variables
    EnvVar,
}

/// Azure AD application credentials
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Directory (tenant) id
    pub tenant_id: String,
    /// Application (client) id
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// A bearer token and when it was obtained
#[derive(Clone)]
pub struct AccessToken {
    /// Bearer token value
    pub token: String,
    /// When the token was acquired
    pub acquired_at: Instant,
}

impl AccessToken {
    /// Wrap a token acquired now
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            acquired_at: Instant::now(),
        }
    }

    /// Time since the token was acquired
    pub fn age(&self) -> Duration {
        self.acquired_at.elapsed()
    }

    /// Whether the token is older than the given validity window
    pub fn is_stale(&self, lifetime: Duration) -> bool {
        self.age() >= lifetime
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("age", &self.age())
            .finish()
    }
}
