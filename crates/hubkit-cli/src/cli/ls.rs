use anyhow::Result;
use clap::Args;
use hubkit::HubClient;

use super::app::{GlobalArgs, RepoArg};

#[derive(Clone, Debug, Args)]
pub struct ListArg {
    #[command(flatten)]
    pub repo: RepoArg,

    /// Only list files matching these glob patterns.
    #[arg(short, long = "include")]
    pub include: Vec<String>,
}

pub async fn run(global: &GlobalArgs, arg: &ListArg) -> Result<()> {
    let client = HubClient::new(global.options())?;
    let files = client
        .select_files(arg.repo.repository(), arg.include.clone())
        .await?;

    for file in files {
        println!("{file}");
    }
    Ok(())
}
