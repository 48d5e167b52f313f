use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::core::{ProgressAggregator, local_path, repo_root, select};
use crate::data::{AggregateProgress, Repository, TransferCallback, TransferProgress};
use crate::effects::fetcher::FileFetcher;
use crate::effects::http::HttpClient;
use crate::effects::resolver::RepoResolver;
use crate::error::Result;

/// Anything usable as a list of glob patterns.
///
/// Lets snapshot calls take a single pattern, a slice, an array or a vector.
/// `()` means "no filtering".
pub trait IntoPatterns {
    fn into_patterns(self) -> Vec<String>;
}

impl IntoPatterns for () {
    fn into_patterns(self) -> Vec<String> {
        Vec::new()
    }
}

impl IntoPatterns for &str {
    fn into_patterns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoPatterns for String {
    fn into_patterns(self) -> Vec<String> {
        vec![self]
    }
}

impl<S: AsRef<str>> IntoPatterns for &[S] {
    fn into_patterns(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> IntoPatterns for [S; N] {
    fn into_patterns(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> IntoPatterns for &[S; N] {
    fn into_patterns(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>> IntoPatterns for Vec<S> {
    fn into_patterns(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

/// Materialize the files of `repo` matching `patterns`, one at a time.
///
/// `on_progress` is invoked on every per-file update with the running
/// aggregate, once after each file lands, and a final time with the completed
/// aggregate. For the last file the after-landing call and the final call are
/// the same call, so `completed == total` is reported exactly once.
///
/// Every selected name is checked against the local layout before anything
/// is requested; a name escaping the repository root fails the whole call
/// with [`Error::InvalidPath`](crate::Error::InvalidPath). The first failing
/// transfer aborts the loop; files already written stay on disk and are
/// skipped by the next call.
pub(crate) async fn run<C, F>(
    resolver: &RepoResolver<C>,
    fetcher: &FileFetcher<C>,
    download_base: &std::path::Path,
    repo: &Repository,
    patterns: &[String],
    on_progress: F,
) -> Result<PathBuf>
where
    C: HttpClient + 'static,
    F: Fn(&AggregateProgress) + Send + Sync + 'static,
{
    let names = resolver.list_files(repo).await?;
    let selected = select(&names, patterns)?;
    let root = repo_root(download_base, repo)?;
    for filename in &selected {
        local_path(download_base, repo, filename)?;
    }
    info!(repo = %repo, listed = names.len(), selected = selected.len(), "starting snapshot");

    let on_progress = Arc::new(on_progress);
    let aggregator = Arc::new(Mutex::new(ProgressAggregator::new(selected.len())));

    for filename in &selected {
        let per_file: TransferCallback = {
            let aggregator = Arc::clone(&aggregator);
            let on_progress = Arc::clone(&on_progress);
            Arc::new(move |progress: &TransferProgress| {
                if let TransferProgress::InProgress(fraction) = progress {
                    let aggregate = lock(&aggregator).advance(*fraction);
                    on_progress(&aggregate);
                }
            })
        };

        if let Err(err) = fetcher.fetch(repo, filename, per_file).await {
            warn!(repo = %repo, file = %filename, %err, "snapshot aborted");
            return Err(err);
        }

        let aggregate = lock(&aggregator).finish_file();
        if !aggregate.is_complete() {
            on_progress(&aggregate);
        }
    }

    let aggregate = lock(&aggregator).progress();
    on_progress(&aggregate);

    info!(repo = %repo, files = selected.len(), "snapshot complete");
    Ok(root)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
