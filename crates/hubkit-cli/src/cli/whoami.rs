use anyhow::Result;
use clap::Args;
use hubkit::HubClient;

use super::app::GlobalArgs;

#[derive(Clone, Debug, Args)]
pub struct WhoamiArg {
    /// Print the full JSON document instead of the account name.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(global: &GlobalArgs, arg: &WhoamiArg) -> Result<()> {
    let client = HubClient::new(global.options())?;
    let identity = client.whoami().await?;

    if arg.json {
        println!("{}", serde_json::to_string_pretty(identity.as_map())?);
    } else {
        println!("{}", identity.get_str("name").unwrap_or("<unknown>"));
    }
    Ok(())
}
