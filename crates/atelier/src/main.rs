//! Atelier CLI binary.
//!
//! This binary provides command-line access to an Atelier store:
//! - Upload assets and new versions
//! - Search, inspect and edit assets
//! - Download versions and derive renditions

use atelier::{AssetService, AtelierConfig, init_observability_with_config};
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, handle_command};

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AtelierConfig::from_file(path)?,
        None => AtelierConfig::load()?,
    };

    // Initialize tracing
    let mut logging = config.logging().clone();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    init_observability_with_config(&logging)?;

    let service = AssetService::open(&config).await?;
    if let Err(e) = handle_command(&service, cli.command).await {
        tracing::error!(condition = %e.condition().code(), error = %e, "Command failed");
        return Err(e.into());
    }

    Ok(())
}
