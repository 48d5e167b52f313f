use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::core::metadata_url;
use crate::data::Repository;
use crate::effects::http::HttpClient;
use crate::effects::transport::Transport;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct RepoInfo {
    siblings: Vec<Sibling>,
}

#[derive(Debug, Deserialize)]
struct Sibling {
    rfilename: String,
}

/// Turns a repository into the list of files its metadata reports.
pub struct RepoResolver<C: HttpClient> {
    transport: Transport<C>,
    endpoint: String,
}

impl<C: HttpClient> RepoResolver<C> {
    pub fn new(transport: Transport<C>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    /// Filenames in the order the server lists them.
    pub async fn list_files(&self, repo: &Repository) -> Result<Vec<String>> {
        let url = metadata_url(&self.endpoint, repo);
        let body = self.transport.get(&url).await?;
        let names = parse_siblings(&body)?;
        debug!(repo = %repo, files = names.len(), "resolved repository metadata");
        Ok(names)
    }
}

/// Extract `siblings[].rfilename` from a metadata document.
pub fn parse_siblings(body: &[u8]) -> Result<Vec<String>> {
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(Error::Parse(serde::de::Error::custom(
            "repository metadata is not a JSON object",
        )));
    }

    let info: RepoInfo = serde_json::from_value(value)?;
    Ok(info.siblings.into_iter().map(|s| s.rfilename).collect())
}
