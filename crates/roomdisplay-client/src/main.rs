//! roomdisplay CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use roomdisplay_core::init_tracing;

use roomdisplay_client::cli::{Cli, Command, ConfigAction};
use roomdisplay_client::commands;
use roomdisplay_client::config::ClientConfig;
use roomdisplay_client::error::{ClientError, ClientResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let watching = matches!(cli.command, Some(Command::Watch { .. }));
    if let Err(e) = init_tracing(config.tracing_config(cli.debug, watching)) {
        eprintln!("warning: {}", e);
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    match cli.config {
        Some(ref path) => ClientConfig::load_from(path).map_err(ClientError::Config),
        None => ClientConfig::load().map_err(ClientError::Config),
    }
}

async fn run(cli: Cli, config: ClientConfig) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);

    match cli.command {
        Some(Command::Watch { interval }) => commands::watch::run(&config, &cli.status, interval).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
        None => commands::status::run(&config, &cli.status).await,
    }
}
