//! Mirrorbot CLI entry point.

use clap::Parser;
use mirrorbot_cli::{default_filter, run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v, which wins over the config file.
    let configured = cli.load_config().ok().and_then(|c| c.logging.level);
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose, configured.as_deref()).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    run(cli).await
}
