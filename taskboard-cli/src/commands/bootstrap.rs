//! Database provisioning commands
//!
//! `bootstrap` creates the application user, collections and indexes.
//! `verify` reports what is in place and exits non-zero if anything is missing.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser};

use taskboard_server::bootstrap::{
    BootstrapMode, BootstrapPlan, Bootstrapper, StepOutcome, DEFAULT_APP_USER,
};
use taskboard_server::db::{create_client, DEFAULT_DATABASE};
use taskboard_server::settings::DEFAULT_MONGODB_URI;

/// Connection options shared by bootstrap and verify
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// MongoDB connection string (needs userAdmin rights on the target database)
    #[arg(long, env = "MONGODB_URI", default_value = DEFAULT_MONGODB_URI)]
    pub mongodb_uri: String,

    /// Database to provision
    #[arg(long, env = "TASKBOARD_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Application user to create
    #[arg(long, env = "TASKBOARD_APP_USER", default_value = DEFAULT_APP_USER)]
    pub app_user: String,
}

/// Arguments for the bootstrap command
#[derive(Parser, Debug)]
pub struct BootstrapArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Password for the application user
    #[arg(long, env = "TASKBOARD_APP_PASSWORD", hide_env_values = true)]
    pub app_password: String,

    /// Skip objects that already exist instead of failing
    #[arg(long)]
    pub if_absent: bool,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Provision the database
pub async fn run_bootstrap(args: BootstrapArgs) -> Result<()> {
    let plan = BootstrapPlan::new(
        args.target.database,
        args.target.app_user,
        args.app_password,
    )?;
    let mode = if args.if_absent {
        BootstrapMode::IfAbsent
    } else {
        BootstrapMode::Strict
    };

    let client = create_client(&args.target.mongodb_uri)
        .await
        .context("Failed to create MongoDB client")?;
    let bootstrapper = Bootstrapper::new(&client, plan);

    let report = bootstrapper
        .run(mode)
        .await
        .context("Bootstrap aborted; steps before the failure were applied")?;

    for (step, outcome) in &report.steps {
        let mark = match outcome {
            StepOutcome::Created => "✓",
            StepOutcome::Skipped => "-",
        };
        println!("{} {}", mark, step);
    }
    println!(
        "Database '{}' initialized ({} created, {} skipped)",
        bootstrapper.plan().database,
        report.created(),
        report.skipped()
    );

    Ok(())
}

/// Check provisioning without changing anything
pub async fn run_verify(args: VerifyArgs) -> Result<()> {
    let plan = BootstrapPlan::for_verify(args.target.database, args.target.app_user)?;

    let client = create_client(&args.target.mongodb_uri)
        .await
        .context("Failed to create MongoDB client")?;
    let status = Bootstrapper::new(&client, plan)
        .verify()
        .await
        .context("Failed to inspect database")?;

    print!("{}", status);
    if !status.is_complete() {
        bail!("database '{}' is not fully provisioned", status.database);
    }

    println!("All checks passed");
    Ok(())
}
