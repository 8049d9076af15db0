//! Console front end for the Airdrop Hunter navigation core
//!
//! Reads `<user> <token>` lines from stdin and prints one JSON transition per
//! line on stdout. A bare `reload` line re-reads the catalog.

use anyhow::Result;
use airdrop_hunter::{bootstrap, console, AppConfig};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only transitions
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,airdrop_hunter=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Airdrop Hunter v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::from_env();
    info!(?config, "Loaded configuration");

    let router = bootstrap::build_router(&config).await?;
    info!(
        records = router.catalog().snapshot().len(),
        "Ready, reading `<user> <token>` lines from stdin"
    );

    let input = BufReader::new(tokio::io::stdin());
    let handled = console::serve(router, input, tokio::io::stdout()).await?;

    info!(handled, "Input closed, shutting down");
    Ok(())
}
