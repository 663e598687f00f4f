//! Configuration commands.

use clap::Args;
use mirrorbot_core::{Config, ConfigError};
use std::path::Path;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show configuration with secrets redacted
    Show,

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, path: &Path) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load(path)?;
            let mut json = serde_json::to_value(&config)?;
            redact(&mut json);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Validate => {
            let config = Config::load(path)?;
            match config.validate() {
                Ok(plan) => {
                    let active = plan.active_rules().len();
                    println!(
                        "Configuration is valid: {} endpoints, {} rules ({} active)",
                        plan.endpoints.len(),
                        plan.rules.len(),
                        active
                    );
                }
                Err(e @ ConfigError::Validation(_)) => {
                    for message in e.validation_messages() {
                        println!("  - {}", message);
                    }
                    anyhow::bail!("Configuration is invalid");
                }
                Err(e) => anyhow::bail!("Configuration error: {}", e),
            }
        }
    }

    Ok(())
}

/// Replace every file API token with a placeholder.
fn redact(json: &mut serde_json::Value) {
    let Some(endpoints) = json.get_mut("endpoints").and_then(|e| e.as_object_mut()) else {
        return;
    };

    for endpoint in endpoints.values_mut() {
        if let Some(token) = endpoint.pointer_mut("/file_api/token") {
            *token = serde_json::Value::String("[REDACTED]".to_string());
        }
    }
}
