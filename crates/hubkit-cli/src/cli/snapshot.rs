use anyhow::{Context, Result};
use clap::Args;
use hubkit::HubClient;
use tracing::info;

use super::app::{GlobalArgs, RepoArg, transfer_mode};
use crate::utils::ui::tracker::{SnapshotTracker, SnapshotTrackerConfig, Tracker};

#[derive(Clone, Debug, Args)]
pub struct SnapshotArg {
    #[command(flatten)]
    pub repo: RepoArg,

    /// Only download files matching these glob patterns.
    #[arg(short, long = "include")]
    pub include: Vec<String>,

    /// Run each transfer as a detached runtime task.
    #[arg(long)]
    pub background: bool,
}

pub async fn run(global: &GlobalArgs, arg: &SnapshotArg) -> Result<()> {
    let options = global.options().transfer_mode(transfer_mode(arg.background));
    let client = HubClient::new(options)?;
    let repo = arg.repo.repository();

    let tracker = SnapshotTracker::new(SnapshotTrackerConfig {
        msg: repo.id.clone(),
        hidden: global.quiet,
    });
    let reporter = tracker.clone();

    let result = client
        .snapshot_with_progress(&repo, arg.include.clone(), move |progress| {
            reporter.update(*progress);
        })
        .await;

    match result {
        Ok(root) => {
            tracker.finish(Some("done".to_string()));
            info!(repo = %repo, path = %root.display(), "snapshot ready");
            println!("{}", root.display());
            Ok(())
        }
        Err(err) => {
            tracker.finish(Some("failed".to_string()));
            Err(err).with_context(|| format!("snapshot of {repo} failed"))
        }
    }
}
