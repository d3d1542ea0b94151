//! Sprintboard CLI binary.

use anyhow::Result;
use sprintboard::cli::Cli;
use sprintboard::config::TrackerConfig;
use tracing_subscriber::EnvFilter;

/// Main entry point for the sprintboard CLI.
///
/// The stores are in-memory and the session is sequential, so a
/// current_thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config = TrackerConfig::load_or_default(cli.config.as_deref()).await?;

    // RUST_LOG wins over the configured filter.
    // Example: RUST_LOG=sprintboard=debug sprintboard demo
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting sprintboard CLI");

    cli.execute(&config).await?;

    tracing::debug!("Sprintboard CLI completed successfully");
    Ok(())
}
