use tracing::debug;

use crate::config::Config;
use crate::core::whoami_url;
use crate::effects::http::HttpClient;
use crate::effects::transport::Transport;
use crate::error::{Error, Result};

/// Look up the account behind the transport's token.
///
/// Fails with [`Error::AuthorizationRequired`] before any request is issued
/// when no token is configured.
pub async fn whoami<C: HttpClient>(transport: &Transport<C>, endpoint: &str) -> Result<Config> {
    if transport.token().is_none() {
        return Err(Error::AuthorizationRequired);
    }

    let body = transport.get(&whoami_url(endpoint)).await?;
    let identity = Config::from_slice(&body)?;
    debug!(name = identity.get_str("name").unwrap_or("<unknown>"), "resolved identity");
    Ok(identity)
}
