//! musical-artifacts CLI entrypoint

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use musical_artifacts::cli::Cli;
use musical_artifacts::config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (stderr, so feed output on stdout stays clean)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Parse CLI, resolve configuration once and hand it down
    let cli = Cli::parse();
    let config = config::load_config()?;
    cli.execute(&config).await
}
