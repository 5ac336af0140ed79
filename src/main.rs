mod commands;
mod config;
mod providers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "runcal")]
#[command(about = "Schedule runbook events and their prep tasks onto a calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with Google and store tokens
    Auth,
    /// Build the schedule graph and print it, touching nothing
    Show,
    /// Build the schedule graph and fully replace the target calendar
    Sync,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Auth => commands::auth::run().await,
        Commands::Show => commands::show::run().await,
        Commands::Sync => commands::sync::run().await,
    }
}
