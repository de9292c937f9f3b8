//! CLI entry and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use authgate_core::config::{self, Config};
use authgate_core::identity::IdentityClient;
use authgate_core::logging;
use authgate_core::providers::{LocalIdentityClient, LocalOptions};
use clap::Parser;
use tracing::info;

mod commands;

#[derive(Parser)]
#[command(name = "authgate")]
#[command(version)]
#[command(about = "Shows whether you are signed in, and lets you sign in or out")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Treat USERNAME as already cached by the identity client (repeatable)
    #[arg(long = "account", value_name = "USERNAME", global = true)]
    accounts: Vec<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print the current sign-in state and exit
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Shows the config file path
    Path,
    /// Creates a default config file
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
        Some(Commands::Status) => {
            let config = load_config()?;
            let _log_guard = logging::init(&config)?;
            commands::status::run(identity_client(&config, &cli.accounts))
        }
        None => {
            let config = load_config()?;
            let _log_guard = logging::init(&config)?;
            commands::interactive::run(&config, identity_client(&config, &cli.accounts))
        }
    }
}

fn load_config() -> Result<Config> {
    let path = config::paths::config_path();
    let config = Config::load_from(&path)?;
    config
        .validate()
        .with_context(|| format!("Invalid config at {}", path.display()))?;
    Ok(config)
}

/// Builds the single identity client shared by everything in this process.
fn identity_client(config: &Config, accounts: &[String]) -> Arc<dyn IdentityClient> {
    let mut options = LocalOptions::from(config);
    if !accounts.is_empty() {
        options.accounts = accounts.to_vec();
    }
    info!(
        client_id = %config.identity.client_id,
        authority = %config.identity.authority,
        cached_accounts = options.accounts.len(),
        "identity client ready"
    );
    Arc::new(LocalIdentityClient::new(options))
}
