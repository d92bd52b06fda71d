pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod token_store;
pub mod unmapped;
pub mod wiring;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use config::AppConfig;

/// Parses arguments, loads configuration, installs logging, and dispatches
/// to the matching subcommand handler. The one entry point `main.rs` calls
/// after building the Tokio runtime.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    config.apply_env_overrides();

    let verbose = match &cli.command {
        Commands::Sync(args) => args.verbose,
        Commands::Watch(args) => args.sync.verbose,
        _ => false,
    };
    let _log_guard = logging::init(&config, verbose)?;

    match cli.command {
        Commands::Login { service } => commands::login(&config, service).await,
        Commands::Logout { service } => commands::logout(service).await,
        Commands::Status => commands::status().await,
        Commands::Sync(args) => commands::sync(&config, &args).await.map(|_| ()),
        Commands::Watch(args) => commands::watch(&config, &args).await,
    }
}
