//! Scenarist CLI binary.
//!
//! This binary runs the script-writing pipeline on a project folder:
//! - Run single stages or the whole pipeline
//! - Read and edit intermediate stage files
//! - Manage users, projects and sharing (with the `database` feature)

use clap::Parser;
use scenarist::cli::{
    Cli, Commands, handle_file_command, handle_project_command, handle_stage_command,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over -v
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Execute the requested command
    match &cli.command {
        Commands::File(cmd) => handle_file_command(&cli, cmd).await?,
        Commands::Project(cmd) => handle_project_command(&cli, cmd).await?,
        _ => handle_stage_command(&cli).await?,
    }

    Ok(())
}
