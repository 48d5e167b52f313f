use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::core::{local_path, repo_root, select};
use crate::data::{AggregateProgress, HubOptions, Repository, TransferCallback};
use crate::effects::http::HttpClient;
use crate::effects::snapshot::{self, IntoPatterns};
use crate::effects::{FileFetcher, RepoResolver, Transport, identity};
use crate::error::Result;

/// Entry point for repository listing, file transfer and snapshots.
///
/// Holds its own configuration; create as many as needed.
///
/// # Examples
///
/// ```no_run
/// # async fn run() -> hubkit::Result<()> {
/// use hubkit::{HubClient, HubOptions};
///
/// let client = HubClient::new(HubOptions::from_env())?;
/// let root = client
///     .snapshot_with_progress("owner/name", "*.json", |p| println!("{p}"))
///     .await?;
/// println!("snapshot at {}", root.display());
/// # Ok(())
/// # }
/// ```
pub struct HubClient<C: HttpClient> {
    client: Arc<C>,
    options: HubOptions,
}

impl<C: HttpClient> Clone for HubClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            options: self.options.clone(),
        }
    }
}

#[cfg(feature = "reqwest")]
impl HubClient<crate::effects::ReqwestClient> {
    /// Client backed by `reqwest`.
    pub fn new(options: HubOptions) -> Result<Self> {
        Ok(Self::with_client(crate::effects::ReqwestClient::new()?, options))
    }
}

impl<C: HttpClient + 'static> HubClient<C> {
    pub fn with_client(client: C, options: HubOptions) -> Self {
        Self::with_shared_client(Arc::new(client), options)
    }

    pub fn with_shared_client(client: Arc<C>, options: HubOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &HubOptions {
        &self.options
    }

    pub fn http(&self) -> &Arc<C> {
        &self.client
    }

    pub fn transport(&self) -> Transport<C> {
        Transport::new(Arc::clone(&self.client), self.options.token.clone())
    }

    pub fn resolver(&self) -> RepoResolver<C> {
        RepoResolver::new(self.transport(), self.options.endpoint.clone())
    }

    pub fn fetcher(&self) -> FileFetcher<C> {
        FileFetcher::new(Arc::clone(&self.client), &self.options)
    }

    /// Local root a repository is materialized under.
    pub fn repo_root(&self, repo: impl Into<Repository>) -> Result<PathBuf> {
        repo_root(&self.options.download_base, &repo.into())
    }

    /// Local path of one file of a repository.
    pub fn local_path(&self, repo: impl Into<Repository>, filename: &str) -> Result<PathBuf> {
        local_path(&self.options.download_base, &repo.into(), filename)
    }

    /// Every filename the repository metadata lists, in server order.
    pub async fn list_files(&self, repo: impl Into<Repository>) -> Result<Vec<String>> {
        self.resolver().list_files(&repo.into()).await
    }

    /// Filenames of the repository matching `patterns`.
    pub async fn select_files(
        &self,
        repo: impl Into<Repository>,
        patterns: impl IntoPatterns,
    ) -> Result<Vec<String>> {
        let names = self.list_files(repo).await?;
        select(&names, &patterns.into_patterns())
    }

    /// Transfer a single file unless it is already present.
    pub async fn fetch_file(
        &self,
        repo: impl Into<Repository>,
        filename: &str,
        on_progress: TransferCallback,
    ) -> Result<PathBuf> {
        self.fetcher().fetch(&repo.into(), filename, on_progress).await
    }

    /// Snapshot without progress reporting.
    pub async fn snapshot(
        &self,
        repo: impl Into<Repository>,
        patterns: impl IntoPatterns,
    ) -> Result<PathBuf> {
        self.snapshot_with_progress(repo, patterns, |_| {}).await
    }

    /// Materialize the selected files of `repo` and return its local root.
    ///
    /// Files are transferred one after another; the first failure aborts the
    /// call. Already present files are skipped, so re-invoking after a
    /// failure resumes where the previous call stopped. Dropping the returned
    /// future cancels the snapshot; in foreground mode the in-flight file is
    /// discarded, in background mode it finishes on the runtime.
    pub async fn snapshot_with_progress<F>(
        &self,
        repo: impl Into<Repository>,
        patterns: impl IntoPatterns,
        on_progress: F,
    ) -> Result<PathBuf>
    where
        F: Fn(&AggregateProgress) + Send + Sync + 'static,
    {
        let repo = repo.into();
        let patterns = patterns.into_patterns();
        snapshot::run(
            &self.resolver(),
            &self.fetcher(),
            &self.options.download_base,
            &repo,
            &patterns,
            on_progress,
        )
        .await
    }

    /// Account details for the configured token.
    pub async fn whoami(&self) -> Result<Config> {
        identity::whoami(&self.transport(), &self.options.endpoint).await
    }

    /// Parse a JSON file from the local snapshot of `repo`.
    pub fn load_config(&self, repo: impl Into<Repository>, filename: &str) -> Result<Config> {
        Config::load(self.local_path(repo, filename)?)
    }
}
