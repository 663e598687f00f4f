//! Mirrorbot command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};
use mirrorbot_core::{paths, Config};
use std::path::PathBuf;

/// Mirrorbot - cross-platform chat message mirroring
#[derive(Parser)]
#[command(name = "mirrorbot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "MIRRORBOT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show resolved forward rules
    Rules,

    /// Inspect the forward ledger
    Records(commands::records::RecordsArgs),

    /// Show version information
    Version,
}

impl Cli {
    /// Config file in use: `--config`, `MIRRORBOT_CONFIG`, or the default.
    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(paths::config_file()?),
        }
    }

    /// Load the config file in use.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        Ok(Config::load(&self.config_path()?)?)
    }
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_filter(verbose: u8, configured: Option<&str>) -> String {
    match (verbose, configured) {
        (0, Some(level)) => level.to_string(),
        (0, None) => "mirrorbot=info".to_string(),
        (1, _) => "mirrorbot=debug".to_string(),
        _ => "mirrorbot=trace".to_string(),
    }
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config_path()?;
    tracing::debug!(path = %config_path.display(), "Using config file");
    match cli.command {
        Commands::Config(args) => commands::config::run(args, &config_path).await,
        Commands::Rules => commands::rules::run(&config_path).await,
        Commands::Records(args) => commands::records::run(args, &config_path).await,
        Commands::Version => {
            println!("mirrorbot {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
