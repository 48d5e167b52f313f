use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use hubkit::{HubOptions, RepoKind, Repository, TransferMode};

use super::{config, ls, snapshot, whoami};

#[derive(Clone, Debug, Parser)]
#[command(name = "hubkit", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Args)]
pub struct GlobalArgs {
    /// API base to talk to.
    #[arg(long, global = true, env = "HF_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Bearer token attached to every request.
    #[arg(long, global = true, env = "HF_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Root directory snapshots are written under.
    #[arg(long = "dir", global = true, env = "HUBKIT_DOWNLOAD_BASE")]
    pub download_base: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl GlobalArgs {
    pub fn options(&self) -> HubOptions {
        let mut options = HubOptions::default().maybe_token(self.token.clone());
        if let Some(endpoint) = &self.endpoint {
            options = options.endpoint(endpoint.as_str());
        }
        if let Some(base) = &self.download_base {
            options = options.download_base(base);
        }
        options
    }
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "ls", name = "list", about = "List the files of a repository")]
    List(ls::ListArg),
    #[command(alias = "dl", name = "snapshot", about = "Download the matching files of a repository")]
    Snapshot(snapshot::SnapshotArg),
    #[command(name = "whoami", about = "Show the account behind the configured token")]
    Whoami(whoami::WhoamiArg),
    #[command(alias = "cfg", name = "config", about = "Look up a key in a downloaded JSON file")]
    Config(config::ConfigArg),
}

/// Repository selection shared by every repository-scoped command.
#[derive(Clone, Debug, Args)]
pub struct RepoArg {
    /// Repository identifier, `owner/name`.
    pub repo: String,

    /// Repository kind: models, datasets or spaces.
    #[arg(long, default_value = "models", value_parser = parse_kind)]
    pub kind: RepoKind,
}

impl RepoArg {
    pub fn repository(&self) -> Repository {
        Repository::new(self.repo.clone(), self.kind)
    }
}

fn parse_kind(s: &str) -> Result<RepoKind, String> {
    s.parse().map_err(|e: hubkit::data::ParseRepoKindError| e.to_string())
}

pub fn transfer_mode(background: bool) -> TransferMode {
    if background {
        TransferMode::Background
    } else {
        TransferMode::Foreground
    }
}
