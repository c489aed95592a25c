//! Error types for store-submit

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the submission client
#[derive(Debug, Error)]
pub enum Error {
    /// Caller-supplied data is inconsistent; never retried
    #[error("invalid input: {0}")]
    Validation(String),

    /// Remote state does not allow the requested operation
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The service answered with a non-success status
    #[error("{method} {path} failed with HTTP {status}{}: {message}", code_suffix(.code))]
    Api {
        /// HTTP method of the failed request
        method: String,
        /// URI fragment that was requested
        path: String,
        /// HTTP status code
        status: u16,
        /// Service error code, when the payload carried one
        code: Option<String>,
        /// Service error message or raw body
        message: String,
    },

    /// Authentication failed or credentials are missing
    #[error("authentication error: {0}")]
    Auth(String),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// A binary transfer to an upload URL failed
    #[error("upload of {path} failed: {message}")]
    Upload {
        /// Local file that was being uploaded
        path: String,
        /// Failure description
        message: String,
        /// Whether another attempt may succeed
        retryable: bool,
    },

    /// An error annotated with the operation and identifiers involved
    #[error("{context}: {source}")]
    Context {
        /// What was being attempted, including identifiers
        context: String,
        /// Underlying error
        #[source]
        source: Box<Error>,
    },

    /// Unexpected response shape or internal inconsistency
    #[error("internal error: {0}")]
    Internal(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

#[allow(clippy::ref_option)]
fn code_suffix(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!(" ({c})")).unwrap_or_default()
}

impl Error {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Upload { retryable, .. } => *retryable,
            Self::Context { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    /// HTTP status of the innermost API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Context { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Attach operation context to a result
pub trait ResultExt<T> {
    /// Wrap the error with a description of the operation being attempted
    fn context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| Error::Context {
            context: f().into(),
            source: Box::new(source),
        })
    }
}
