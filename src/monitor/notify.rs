//! Mail notifications for submission status changes

use crate::auth::{fetch_access_token, AccessToken, StoreAuthConfig, GRAPH_RESOURCE};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::upload::RetryPolicy;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};
use url::Url;

/// Mail delivery
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message to every recipient
    async fn send_mail(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()>;
}

/// Sends mail through the Microsoft Graph `sendMail` endpoint
pub struct GraphMailer {
    client: Client,
    auth: StoreAuthConfig,
    sender: String,
    graph_url: Url,
    token_lifetime: Duration,
    token: Mutex<Option<AccessToken>>,
}

impl GraphMailer {
    /// Create a mailer; requires `mail_sender` and client credentials
    ///
    /// A static `STORE_ACCESS_TOKEN` is issued for the store service only and
    /// Graph rejects it, so it is refused here rather than on every mail.
    pub fn new(config: &Config, auth: StoreAuthConfig) -> Result<Self> {
        let sender = config.mail_sender.clone().ok_or_else(|| {
            Error::Config("mail_sender must be set to send notifications".to_string())
        })?;
        if matches!(auth, StoreAuthConfig::StaticToken(_)) {
            return Err(Error::Auth(
                "mail notifications need client credentials (STORE_TENANT_ID, STORE_CLIENT_ID, \
                 STORE_CLIENT_SECRET); STORE_ACCESS_TOKEN is only valid for the store service"
                    .to_string(),
            ));
        }

        let mut base = config.graph_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("store-submit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            auth,
            sender,
            graph_url: Url::parse(&base)?,
            token_lifetime: config.token_lifetime(),
            token: Mutex::new(None),
        })
    }

    async fn bearer(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| !t.is_stale(self.token_lifetime)) {
            return Ok(token.token.clone());
        }
        let token = fetch_access_token(&self.client, &self.auth, GRAPH_RESOURCE).await?;
        let value = token.token.clone();
        *guard = Some(token);
        Ok(value)
    }
}

#[async_trait]
impl Notifier for GraphMailer {
    async fn send_mail(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()> {
        let path = format!("users/{}/sendMail", urlencoding::encode(&self.sender));
        let url = self.graph_url.join(&path)?;
        let to: Vec<Value> = recipients
            .iter()
            .map(|address| json!({"emailAddress": {"address": address}}))
            .collect();
        let message = json!({
            "message": {
                "subject": subject,
                "body": {"contentType": "Text", "content": body},
                "toRecipients": to,
            },
            "saveToSentItems": false,
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(self.bearer().await?)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                method: "POST".to_string(),
                path,
                status: status.as_u16(),
                code: None,
                message: text,
            });
        }

        debug!(recipients = recipients.len(), subject, "sent notification");
        Ok(())
    }
}

/// Send mail, retrying with fixed backoff; failures are logged, never returned
///
/// Returns whether the mail went out.
pub async fn notify_best_effort(
    notifier: &dyn Notifier,
    subject: &str,
    body: &str,
    recipients: &[String],
    policy: RetryPolicy,
) -> bool {
    if recipients.is_empty() {
        return false;
    }

    for attempt in 1..=policy.attempts.max(1) {
        match notifier.send_mail(subject, body, recipients).await {
            Ok(()) => return true,
            Err(e) if attempt < policy.attempts => {
                warn!(attempt, error = %e, "sending notification failed, retrying");
                tokio::time::sleep(policy.backoff).await;
            }
            Err(e) => {
                error!(attempts = attempt, error = %e, subject, "giving up on notification");
            }
        }
    }
    false
}
