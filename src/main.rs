//! Reelgraph CLI
//!
//! Compiles a multi-track editing timeline into a single ffmpeg
//! `-filter_complex` graph, and optionally runs the export.
//!
//! # Usage
//!
//! ```bash
//! reelgraph compile --project edit.json
//! reelgraph compile --project edit.yaml --start 00:10 --duration 5 --json
//! reelgraph export --project edit.json -o out.mp4
//! reelgraph args --project edit.json --codec libx264
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use reelgraph_cli::adapters::init_tracing;
use reelgraph_cli::cli::{commands, Cli, Commands};
use reelgraph_cli::config_initialization::initialize_configuration_hierarchy;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration_hierarchy(&cli)?;
    init_tracing(&config.logging.level, config.logging.json)?;
    debug!(?config, "Configuration resolved");

    match cli.command {
        Commands::Compile(args) => {
            info!("Executing compile command");
            commands::compile(args, &config).await?;
        }
        Commands::Export(args) => {
            info!("Executing export command");
            commands::export(args, &config).await?;
        }
        Commands::Args(args) => {
            debug!("Executing args command");
            commands::print_args(args, &config).await?;
        }
    }

    Ok(())
}
