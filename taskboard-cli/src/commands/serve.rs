//! HTTP server command
//!
//! Runs the dashboard server. Flags override `TASKBOARD_*` environment
//! settings.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use taskboard_server::models::UserEmail;
use taskboard_server::Settings;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// MongoDB connection string
    #[arg(long, env = "MONGODB_URI")]
    pub mongodb_uri: Option<String>,

    /// Application database name (default: todo_db)
    #[arg(long)]
    pub database: Option<String>,

    /// Email of the user shown when a request carries no identity
    #[arg(long, value_name = "EMAIL")]
    pub default_user_email: Option<String>,

    /// Server selection timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub mongo_timeout: Option<u64>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

impl ServeArgs {
    /// Environment settings with command-line overrides applied
    fn settings(self) -> Result<Settings> {
        let mut settings = Settings::from_env().context("Invalid server environment")?;

        if let Some(bind) = self.bind {
            settings.bind_addr = bind;
        }
        if let Some(uri) = self.mongodb_uri {
            settings.mongodb_uri = uri;
        }
        if let Some(database) = self.database {
            settings.database = database;
        }
        if let Some(email) = self.default_user_email {
            let email = UserEmail::new(&email).context("Invalid --default-user-email")?;
            settings.default_user_email = Some(email);
        }
        if let Some(secs) = self.mongo_timeout {
            settings.mongo_timeout = Duration::from_secs(secs);
        }
        settings.cors_permissive |= self.cors_permissive;

        Ok(settings)
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let settings = args.settings()?;

    tracing::info!(
        bind = %settings.bind_addr,
        database = %settings.database,
        default_user = settings.default_user_email.as_ref().map(UserEmail::as_str),
        "Starting taskboard server"
    );

    // Run server (blocks until shutdown)
    taskboard_server::serve(settings)
        .await
        .context("Server error")?;

    Ok(())
}
