mod cli;
mod commands;
mod output;

use caller_shell::config::DEFAULT_CONFIG_PATH;
use caller_shell::{Error as ShellError, Parser as ConfigParser, Shell};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(shell_error) = e.downcast_ref::<ShellError>() {
            eprintln!("Error: {}", shell_error);
            if let Some(suggestion) = shell_error.suggestion() {
                eprintln!("\nHint: {}", suggestion);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = ConfigParser::new().load_config(&config_path)?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.path = data_dir;
    }

    // Held until exit so buffered file logs are flushed.
    let _log_guard = caller_shell::logging::init(&config.logging)?;

    let out = output::CliOutput;

    match cli.command {
        Commands::CheckConfig => commands::run_check_config(&config, &config_path, &out),
        Commands::Run => commands::run_shell(Shell::new(config), &out).await,
        Commands::ClientId => commands::run_client_id(&Shell::new(config), &out).await,
        Commands::ForwardUrl { url } => {
            commands::run_forward_url(&Shell::new(config), url.as_deref(), &out).await
        }
        Commands::Data(ref data_cmd) => {
            commands::run_data(&Shell::new(config), data_cmd, &out).await
        }
    }
}
