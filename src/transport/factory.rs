//! Transport factory
//!
//! Creates the store transport from configuration and environment credentials.

use crate::auth::get_store_auth;
use crate::config::Config;
use crate::error::Result;
use crate::transport::{HttpTransport, RestTransport};

/// Create a transport from configuration
///
/// Resolves credentials from the environment; the token itself is acquired
/// lazily on the first call.
pub fn create_transport(config: &Config) -> Result<Box<dyn RestTransport>> {
    let auth = get_store_auth()?;
    tracing::debug!(source = ?auth.source(), service_url = %config.service_url, "creating transport");
    Ok(Box::new(HttpTransport::new(config, auth)?))
}
