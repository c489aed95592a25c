//! Client configuration
//!
//! One explicit [`Config`] value is built at startup and handed to the
//! transport, uploader, orchestrator and monitor. Sources, lowest priority
//! first: built-in defaults, `<config_dir>/store-submit/config.json`,
//! `STORE_SUBMIT_<FIELD>` environment variables.

use crate::error::{Error, Result};
use crate::transport::PageRequest;
use config::{Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const ENV_PREFIX: &str = "STORE_SUBMIT";
const ENV_SEPARATOR: &str = "__";

/// Default service endpoint
pub const DEFAULT_SERVICE_URL: &str = "https://manage.devcenter.microsoft.com/v1.0/my/";

/// Default Microsoft Graph endpoint for notification mail
pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0/";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL every URI fragment is resolved against
    pub service_url: String,
    /// Timeout applied to every REST call
    pub request_timeout_secs: u64,
    /// Attempts for idempotent requests that fail transiently
    pub request_retries: u32,
    /// Pause between request attempts
    pub request_retry_backoff_secs: u64,
    /// How long an access token is trusted before a forced refresh
    pub token_lifetime_secs: u64,
    /// Attempts per asset upload (and per block of a large one)
    pub upload_retries: u32,
    /// Bytes per block; larger files are uploaded in blocks of this size
    pub upload_block_size: u64,
    /// Pause between upload attempts
    pub upload_retry_backoff_secs: u64,
    /// Default monitor poll interval
    pub poll_interval_secs: u64,
    /// Attempts per notification mail
    pub mail_retries: u32,
    /// Pause between mail attempts
    pub mail_retry_backoff_secs: u64,
    /// Mailbox notifications are sent from
    pub mail_sender: Option<String>,
    /// Graph endpoint notification mail is sent through
    pub graph_url: String,
    /// Page size for list endpoints
    pub page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            request_timeout_secs: 100,
            request_retries: 3,
            request_retry_backoff_secs: 2,
            // Azure AD tokens live 60 minutes; refresh a minute early
            token_lifetime_secs: 59 * 60,
            upload_retries: 3,
            upload_block_size: 8 * 1024 * 1024,
            upload_retry_backoff_secs: 5,
            poll_interval_secs: 60,
            mail_retries: 3,
            mail_retry_backoff_secs: 5,
            mail_sender: None,
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            page_size: 100,
        }
    }
}

/// Field names, which double as `STORE_SUBMIT_*` variable suffixes
const FIELDS: &[&str] = &[
    "service_url",
    "request_timeout_secs",
    "request_retries",
    "request_retry_backoff_secs",
    "token_lifetime_secs",
    "upload_retries",
    "upload_block_size",
    "upload_retry_backoff_secs",
    "poll_interval_secs",
    "mail_retries",
    "mail_retry_backoff_secs",
    "mail_sender",
    "graph_url",
    "page_size",
];

impl Config {
    /// Load defaults, then the default config file (if any), then env overrides
    pub fn load() -> Result<Self> {
        let path = default_config_path().filter(|path| path.exists());
        Self::load_from_sources(path.as_deref(), env_overrides())
    }

    /// Load an explicit JSON file, then env overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Config(format!("cannot read {}: no such file", path.display())));
        }
        Self::load_from_sources(Some(path), env_overrides())
    }

    /// Layer an optional JSON file and the given `STORE_SUBMIT_*` variables over the defaults
    pub fn load_from_sources(path: Option<&Path>, env: Map<String, String>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!(path = %path.display(), "loading configuration");
            builder = builder.add_source(File::from(path).format(FileFormat::Json));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(Some(env)),
        );

        let layered = builder.build().map_err(|e| match path {
            Some(path) => Error::Config(format!("cannot parse {}: {e}", path.display())),
            None => Error::Config(e.to_string()),
        })?;
        layered
            .try_deserialize()
            .map_err(|e| Error::Config(format!("invalid configuration: {e}")))
    }

    /// Request timeout
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Backoff between request attempts
    pub const fn request_retry_backoff(&self) -> Duration {
        Duration::from_secs(self.request_retry_backoff_secs)
    }

    /// Token validity window
    pub const fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_lifetime_secs)
    }

    /// Block size for uploads, at least one byte
    pub fn upload_block_size(&self) -> usize {
        usize::try_from(self.upload_block_size).unwrap_or(usize::MAX).max(1)
    }

    /// Page request for list endpoints
    pub const fn page_request(&self) -> PageRequest {
        PageRequest {
            max_results: self.page_size,
            start_at: 0,
            get_all: true,
        }
    }

    /// Backoff between upload attempts
    pub const fn upload_retry_backoff(&self) -> Duration {
        Duration::from_secs(self.upload_retry_backoff_secs)
    }

    /// Monitor poll interval
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Backoff between mail attempts
    pub const fn mail_retry_backoff(&self) -> Duration {
        Duration::from_secs(self.mail_retry_backoff_secs)
    }
}

/// `<config_dir>/store-submit/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("store-submit").join("config.json"))
}

/// `STORE_SUBMIT_*` variables that name a config field
///
/// Other variables under the prefix (log filter, test switches) are left
/// out so they do not trip the unknown-field check.
fn env_overrides() -> Map<String, String> {
    env::vars()
        .filter(|(name, _)| {
            name.strip_prefix(ENV_PREFIX)
                .and_then(|rest| rest.strip_prefix('_'))
                .is_some_and(|field| FIELDS.contains(&field.to_ascii_lowercase().as_str()))
        })
        .collect()
}
