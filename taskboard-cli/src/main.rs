//! taskboard CLI - task dashboard server and database provisioning
//!
//! Subcommands:
//! - `serve`: run the dashboard HTTP server
//! - `bootstrap`: create the application user, collections and indexes
//! - `verify`: check that provisioning is complete

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "taskboard",
    author,
    version,
    about = "Task dashboard server backed by MongoDB"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the dashboard HTTP server
    Serve(commands::serve::ServeArgs),
    /// Create the application user, collections and indexes
    Bootstrap(commands::bootstrap::BootstrapArgs),
    /// Check that the database is fully provisioned
    Verify(commands::bootstrap::VerifyArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Bootstrap(args) => commands::run_bootstrap(args).await,
        Commands::Verify(args) => commands::run_verify(args).await,
    }
}
