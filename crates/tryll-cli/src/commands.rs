use super::args::{Cli, Commands};
use super::handlers;
use crate::logging;
use anyhow::{Context, Result};
use clap::CommandFactory;
use tryll_runtime::ClientSettings;

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Init { force } => handlers::init::handle(cli.config.as_deref(), force, cli.format),

        Commands::Decode { file } => handlers::decode::handle(file.as_deref(), cli.format),

        Commands::Chat => {
            let settings = load_settings(&cli.config, &cli.base_url)?;
            runtime()?.block_on(handlers::chat::handle(&settings, cli.format))
        }

        Commands::Config => {
            let settings = load_settings(&cli.config, &cli.base_url)?;
            runtime()?.block_on(handlers::config::handle(&settings, cli.format))
        }

        Commands::Chunks { ids } => {
            let settings = load_settings(&cli.config, &cli.base_url)?;
            runtime()?.block_on(handlers::chunks::handle(&settings, ids, cli.format))
        }
    }
}

fn load_settings(config: &Option<String>, base_url: &Option<String>) -> Result<ClientSettings> {
    ClientSettings::load(config.as_deref(), base_url.as_deref()).context("Failed to load settings")
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}
