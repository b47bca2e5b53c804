use anyhow::Result;
use clap::Parser;
use impact_engine::cli::{Cli, CliHandler};
use impact_engine::logging::initialize_logging;
use tracing::{error, info};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = cli.resolve_config()?;

    // Initialize logging
    initialize_logging(&config.logging)?;
    info!("Loaded configuration: {:?}", config);

    // Load data and compute Impact Plus
    let handler = match CliHandler::new(config) {
        Ok(handler) => handler,
        Err(e) => {
            error!("❌ Failed to compute Impact Plus: {:#}", e);
            return Err(e);
        }
    };

    // Handle command
    handler.handle_command(cli.command)?;

    Ok(())
}
