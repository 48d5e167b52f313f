use anyhow::Result;
use clap::Parser;
use cli::app::{App, Commands};

mod cli;
mod utils;

fn main() -> Result<()> {
    let app = App::parse();
    init_tracing(app.global.verbose, app.global.quiet);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match &app.cmd {
            Commands::List(arg) => cli::ls::run(&app.global, arg).await,
            Commands::Snapshot(arg) => cli::snapshot::run(&app.global, arg).await,
            Commands::Whoami(arg) => cli::whoami::run(&app.global, arg).await,
            Commands::Config(arg) => cli::config::run(&app.global, arg),
        }
    })
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        _ => "trace",
    };

    let filter = format!("hubkit={level},hubkit_cli={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
