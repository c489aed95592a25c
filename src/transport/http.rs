//! HTTP transport using reqwest

use crate::auth::{fetch_access_token, AccessToken, StoreAuthConfig, SERVICE_RESOURCE};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::transport::RestTransport;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

/// Store service transport over reqwest
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    auth: StoreAuthConfig,
    token: Mutex<Option<AccessToken>>,
    retries: u32,
    retry_backoff: Duration,
}

/// Service error payload, either flat or wrapped in `error`
#[derive(Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<Box<ServiceError>>,
}

impl HttpTransport {
    /// Create a new transport
    pub fn new(config: &Config, auth: StoreAuthConfig) -> Result<Self> {
        let mut base = config.service_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("store-submit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            auth,
            token: Mutex::new(None),
            retries: config.request_retries.max(1),
            retry_backoff: config.request_retry_backoff(),
        })
    }

    async fn bearer(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            return Ok(token.token.clone());
        }
        let token = fetch_access_token(&self.client, &self.auth, SERVICE_RESOURCE).await?;
        let value = token.token.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn send_once(&self, method: &Method, uri_fragment: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.base_url.join(uri_fragment)?;
        let bearer = self.bearer().await?;

        debug!(%method, path = uri_fragment, "store request");

        let mut request = self
            .client
            .request(method.clone(), url)
            .bearer_auth(bearer)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(method, uri_fragment, status, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn api_error(method: &Method, path: &str, status: StatusCode, body: &str) -> Error {
    let parsed: Option<ServiceError> = serde_json::from_str(body).ok();
    let (code, message) = match parsed {
        Some(ServiceError {
            error: Some(inner), ..
        }) => (inner.code, inner.message),
        Some(ServiceError { code, message, .. }) => (code, message),
        None => (None, None),
    };

    Error::Api {
        method: method.to_string(),
        path: path.to_string(),
        status: status.as_u16(),
        code,
        message: message.unwrap_or_else(|| body.to_string()),
    }
}

/// Verbs that may be re-sent without creating duplicate remote state
fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::PUT | Method::DELETE | Method::HEAD)
}

#[async_trait]
impl RestTransport for HttpTransport {
    async fn invoke(&self, method: Method, uri_fragment: &str, body: Option<&Value>) -> Result<Value> {
        let mut attempt = 1;
        let mut refreshed = false;

        loop {
            match self.send_once(&method, uri_fragment, body).await {
                Ok(value) => return Ok(value),
                // Token revoked or expired early: refresh once and replay
                Err(Error::Api { status: 401, .. }) if !refreshed => {
                    debug!(path = uri_fragment, "401 from service, refreshing token");
                    self.reauthenticate().await?;
                    refreshed = true;
                }
                Err(e) if e.is_transient() && is_idempotent(&method) && attempt < self.retries => {
                    warn!(%method, path = uri_fragment, attempt, error = %e, "transient failure, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn token_age(&self) -> Option<Duration> {
        self.token.lock().await.as_ref().map(AccessToken::age)
    }

    async fn reauthenticate(&self) -> Result<()> {
        let token = fetch_access_token(&self.client, &self.auth, SERVICE_RESOURCE).await?;
        *self.token.lock().await = Some(token);
        Ok(())
    }
}
