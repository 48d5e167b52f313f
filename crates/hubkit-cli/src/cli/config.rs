use anyhow::{Result, bail};
use clap::Args;
use hubkit::HubClient;

use super::app::{GlobalArgs, RepoArg};

#[derive(Clone, Debug, Args)]
pub struct ConfigArg {
    #[command(flatten)]
    pub repo: RepoArg,

    /// Key to look up; dotted paths reach into nested objects.
    pub key: String,

    /// JSON file inside the local snapshot.
    #[arg(long, default_value = "config.json")]
    pub file: String,
}

pub fn run(global: &GlobalArgs, arg: &ConfigArg) -> Result<()> {
    let client = HubClient::new(global.options())?;
    let config = client.load_config(arg.repo.repository(), &arg.file)?;

    let Some(value) = config.get(&arg.key) else {
        bail!("key '{}' not found in {}", arg.key, arg.file);
    };

    match value.as_str() {
        Some(s) => println!("{s}"),
        None => println!("{value}"),
    }
    Ok(())
}
