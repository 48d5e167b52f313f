use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::{classify, file_url, local_path};
use crate::data::{HubOptions, Repository, TransferCallback, TransferMode, TransferProgress};
use crate::effects::http::HttpClient;
use crate::effects::transport::{bearer_headers, network_error};
use crate::error::{Error, Result};

/// Transfers one remote file to its place in the local layout.
///
/// A file already present at its destination is never requested again.
/// Bytes are streamed into a staging file next to the destination and moved
/// into place only once the body has been fully received, so an interrupted
/// transfer never leaves a partial file where a later call would skip it.
pub struct FileFetcher<C: HttpClient> {
    client: Arc<C>,
    endpoint: String,
    download_base: PathBuf,
    token: Option<String>,
    mode: TransferMode,
}

impl<C: HttpClient> Clone for FileFetcher<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            endpoint: self.endpoint.clone(),
            download_base: self.download_base.clone(),
            token: self.token.clone(),
            mode: self.mode,
        }
    }
}

impl<C: HttpClient + 'static> FileFetcher<C> {
    pub fn new(client: Arc<C>, options: &HubOptions) -> Self {
        Self {
            client,
            endpoint: options.endpoint.clone(),
            download_base: options.download_base.clone(),
            token: options.token.clone(),
            mode: options.transfer_mode,
        }
    }

    pub fn destination(&self, repo: &Repository, filename: &str) -> Result<PathBuf> {
        local_path(&self.download_base, repo, filename)
    }

    pub fn source_url(&self, repo: &Repository, filename: &str) -> String {
        file_url(&self.endpoint, repo, filename)
    }

    /// Make `filename` from `repo` available locally and return its path.
    ///
    /// `on_progress` receives `InProgress` fractions while bytes arrive, then
    /// `Completed` or `Failed`. It is not invoked at all when the file is
    /// already present. Every other outcome, including a name that escapes
    /// the download base or a directory that cannot be created, ends with
    /// `Failed`. Errors are returned unchanged; nothing is retried.
    pub async fn fetch(
        &self,
        repo: &Repository,
        filename: &str,
        on_progress: TransferCallback,
    ) -> Result<PathBuf> {
        match self.materialize(repo, filename, &on_progress).await {
            Ok((destination, None)) => Ok(destination),
            Ok((destination, Some(bytes))) => {
                debug!(file = filename, bytes, "download complete");
                on_progress(&TransferProgress::Completed);
                Ok(destination)
            }
            Err(err) => {
                debug!(file = filename, %err, "download failed");
                on_progress(&TransferProgress::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Returns the destination and, unless the file was already present, the
    /// number of bytes transferred.
    async fn materialize(
        &self,
        repo: &Repository,
        filename: &str,
        on_progress: &TransferCallback,
    ) -> Result<(PathBuf, Option<u64>)> {
        let destination = self.destination(repo, filename)?;
        if tokio::fs::try_exists(&destination).await? {
            debug!(file = filename, path = %destination.display(), "already present, skipping");
            return Ok((destination, None));
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let source = self.source_url(repo, filename);
        let headers = bearer_headers(self.token.as_deref());
        debug!(file = filename, url = %source, mode = ?self.mode, "downloading");

        let bytes = match self.mode {
            TransferMode::Foreground => {
                transfer(self.client.as_ref(), &source, &destination, &headers, on_progress).await?
            }
            TransferMode::Background => {
                let client = Arc::clone(&self.client);
                let target = destination.clone();
                let on_progress = Arc::clone(on_progress);
                tokio::spawn(async move {
                    transfer(client.as_ref(), &source, &target, &headers, &on_progress).await
                })
                .await
                .map_err(|e| Error::TransferAborted(e.to_string()))??
            }
        };

        Ok((destination, Some(bytes)))
    }
}

/// Stream `source` into a staging file and move it onto `destination`.
///
/// Returns the number of bytes written.
async fn transfer<C: HttpClient>(
    client: &C,
    source: &str,
    destination: &Path,
    headers: &[(String, String)],
    on_progress: &TransferCallback,
) -> Result<u64> {
    let response = client.stream(source, headers).await.map_err(network_error)?;
    classify(response.status)?;

    let staging_dir = destination.parent().unwrap_or_else(|| Path::new("."));
    let (file, staging_path) = tempfile::Builder::new()
        .prefix(".hubkit-")
        .suffix(".part")
        .tempfile_in(staging_dir)?
        .into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let total = response.content_length;
    let mut body = response.body;
    let mut received = 0u64;
    on_progress(&TransferProgress::in_progress(0.0));

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(network_error)?;
        file.write_all(&chunk).await?;
        received += chunk.len() as u64;
        on_progress(&TransferProgress::in_progress(fraction(received, total)));
    }

    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    // Dropping `staging_path` on any earlier return removes the partial file.
    staging_path.persist(destination).map_err(|e| Error::Io(e.error))?;
    Ok(received)
}

fn fraction(received: u64, total: Option<u64>) -> f64 {
    match total {
        Some(total) if total > 0 => received as f64 / total as f64,
        _ => 0.0,
    }
}
