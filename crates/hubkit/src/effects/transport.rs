use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::core::classify;
use crate::effects::http::HttpClient;
use crate::error::{Error, Result};

/// Single-attempt GET with optional bearer authentication and status
/// classification.
pub struct Transport<C: HttpClient> {
    client: Arc<C>,
    token: Option<String>,
}

impl<C: HttpClient> Clone for Transport<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            token: self.token.clone(),
        }
    }
}

impl<C: HttpClient> Transport<C> {
    pub fn new(client: Arc<C>, token: Option<String>) -> Self {
        Self { client, token }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> Vec<(String, String)> {
        bearer_headers(self.token.as_deref())
    }

    /// Fetch `url` and return the body of a 2xx response.
    pub async fn get(&self, url: &str) -> Result<Bytes> {
        debug!(url, authenticated = self.token.is_some(), "GET");
        let response = self
            .client
            .get(url, &self.headers())
            .await
            .map_err(network_error)?;

        classify(response.status).inspect_err(|err| {
            debug!(url, status = response.status, %err, "request rejected");
        })?;

        Ok(response.body)
    }
}

/// `Authorization: Bearer {token}` when a token is present.
pub fn bearer_headers(token: Option<&str>) -> Vec<(String, String)> {
    token
        .map(|token| ("Authorization".to_string(), format!("Bearer {token}")))
        .into_iter()
        .collect()
}

pub(crate) fn network_error<E: std::error::Error>(e: E) -> Error {
    Error::Network(e.to_string())
}
