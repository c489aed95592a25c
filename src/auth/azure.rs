//! Azure AD client-credentials authentication

use crate::auth::{AccessToken, AuthSource, ClientCredentials};
use crate::error::{Error, Result};
use crate::transport::RestTransport;
use reqwest::{Client, Method};
use serde::Deserialize;
use std::env;

/// Azure AD authority used when `STORE_AUTHORITY` is unset
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/";

/// Resource of the store submission service
pub const SERVICE_RESOURCE: &str = "https://manage.devcenter.microsoft.com";

/// Resource of Microsoft Graph, used for mail notifications
pub const GRAPH_RESOURCE: &str = "https://graph.microsoft.com";

/// Store authentication configuration
#[derive(Clone)]
pub enum StoreAuthConfig {
    /// A bearer token issued elsewhere
    StaticToken(String),
    /// Client credentials exchanged for a token on demand
    ClientCredentials {
        /// Application credentials
        credentials: ClientCredentials,
        /// Token authority base URL
        authority: String,
    },
}

impl StoreAuthConfig {
    /// Where the configuration was obtained from
    pub const fn source(&self) -> AuthSource {
        match self {
            Self::StaticToken(_) => AuthSource::StaticToken,
            Self::ClientCredentials { .. } => AuthSource::EnvVar,
        }
    }
}

impl std::fmt::Debug for StoreAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaticToken(_) => f.write_str("StaticToken(<redacted>)"),
            Self::ClientCredentials {
                credentials,
                authority,
            } => f
                .debug_struct("ClientCredentials")
                .field("credentials", credentials)
                .field("authority", authority)
                .finish(),
        }
    }
}

/// Get store authentication
///
/// Priority:
/// 1. `STORE_ACCESS_TOKEN` environment variable
/// 2. `STORE_TENANT_ID`, `STORE_CLIENT_ID` and `STORE_CLIENT_SECRET`
pub fn get_store_auth() -> Result<StoreAuthConfig> {
    if let Ok(token) = env::var("STORE_ACCESS_TOKEN") {
        if !token.trim().is_empty() {
            return Ok(StoreAuthConfig::StaticToken(token.trim().to_string()));
        }
    }

    let tenant_id = env::var("STORE_TENANT_ID").ok();
    let client_id = env::var("STORE_CLIENT_ID").ok();
    let client_secret = env::var("STORE_CLIENT_SECRET").ok();

    match (tenant_id, client_id, client_secret) {
        (Some(tenant_id), Some(client_id), Some(client_secret)) => {
            let authority = env::var("STORE_AUTHORITY").unwrap_or_else(|_| DEFAULT_AUTHORITY.to_string());
            Ok(StoreAuthConfig::ClientCredentials {
                credentials: ClientCredentials {
                    tenant_id,
                    client_id,
                    client_secret,
                },
                authority,
            })
        }
        _ => Err(Error::Auth(
            "No store credentials found. Set STORE_TENANT_ID, STORE_CLIENT_ID and STORE_CLIENT_SECRET, or STORE_ACCESS_TOKEN"
                .to_string(),
        )),
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Obtain a bearer token for `resource`
///
/// A static token is returned as-is whatever the resource.
pub async fn fetch_access_token(
    client: &Client,
    config: &StoreAuthConfig,
    resource: &str,
) -> Result<AccessToken> {
    match config {
        StoreAuthConfig::StaticToken(token) => Ok(AccessToken::new(token.clone())),
        StoreAuthConfig::ClientCredentials {
            credentials,
            authority,
        } => {
            let url = format!(
                "{}/{}/oauth2/token",
                authority.trim_end_matches('/'),
                urlencoding::encode(&credentials.tenant_id)
            );

            let response = client
                .post(&url)
                .form(&[
                    ("grant_type", "client_credentials"),
                    ("client_id", credentials.client_id.as_str()),
                    ("client_secret", credentials.client_secret.as_str()),
                    ("resource", resource),
                ])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Auth(format!(
                    "token request for tenant {} failed with HTTP {}: {}",
                    credentials.tenant_id,
                    status.as_u16(),
                    body
                )));
            }

            let token: TokenResponse = response.json().await?;
            tracing::debug!(tenant_id = %credentials.tenant_id, resource, "acquired access token");
            Ok(AccessToken::new(token.access_token))
        }
    }
}

/// Test store authentication
///
/// Issues a minimal authenticated request and returns how many
/// applications the account can see.
pub async fn test_store_auth(transport: &dyn RestTransport) -> Result<u64> {
    let response = transport
        .invoke(Method::GET, "applications?top=1", None)
        .await
        .map_err(|e| Error::Auth(format!("Invalid credentials: {e}")))?;

    Ok(response
        .get("totalCount")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or_default())
}
