//! REST transport for the store service
//!
//! Provides a unified interface for authenticated calls so the submission
//! workflow can run against the real service or an in-memory double.

mod factory;
mod http;

pub use factory::create_transport;
pub use http::HttpTransport;

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// Paging parameters for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Items per page
    pub max_results: u32,
    /// Offset of the first item
    pub start_at: u32,
    /// Follow `@nextLink` until exhausted
    pub get_all: bool,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            max_results: 100,
            start_at: 0,
            get_all: true,
        }
    }
}

/// Transport trait for authenticated REST calls
///
/// Implementations resolve `uri_fragment` against the service base URL,
/// attach a bearer token, and turn non-success responses into
/// [`Error::Api`] carrying the status and parsed service error.
#[async_trait]
pub trait RestTransport: Send + Sync {
    /// Perform one call and return the parsed JSON body (`Null` when empty)
    async fn invoke(&self, method: Method, uri_fragment: &str, body: Option<&Value>)
    -> Result<Value>;

    /// Age of the cached access token, `None` if none has been acquired
    async fn token_age(&self) -> Option<Duration>;

    /// Discard the cached token and acquire a fresh one
    async fn reauthenticate(&self) -> Result<()>;

    /// Collect the `value` items of a paginated list endpoint
    async fn invoke_multiple_page(&self, uri_fragment: &str, page: PageRequest) -> Result<Vec<Value>> {
        let separator = if uri_fragment.contains('?') { '&' } else { '?' };
        let mut next = Some(format!(
            "{uri_fragment}{separator}top={}&skip={}",
            page.max_results, page.start_at
        ));
        let mut items = Vec::new();

        while let Some(fragment) = next.take() {
            let response = self.invoke(Method::GET, &fragment, None).await?;
            match response.get("value") {
                Some(Value::Array(values)) => items.extend(values.iter().cloned()),
                Some(_) => {
                    return Err(Error::Internal(format!(
                        "list response for {fragment} has a non-array 'value'"
                    )));
                }
                None => {}
            }

            if page.get_all {
                next = response
                    .get("@nextLink")
                    .and_then(Value::as_str)
                    .filter(|link| !link.is_empty())
                    .map(ToString::to_string);
            }
        }

        Ok(items)
    }
}
