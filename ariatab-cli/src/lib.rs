//! ariatab - Command line front end
//!
//! - `check`: serve a page, drive it in headless Chrome and report conformance
//! - `audit`: static ARIA markup audit of an HTML file
//! - `serve`: serve a directory for manual testing
//!
//! Exit codes: 0 when everything conforms, 1 when checks fail, 2 when the
//! run could not be set up.

mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::{AuditArgs, CheckArgs, RunStatus, ServeArgs};

/// Conformance checker for accessible tab widgets
#[derive(Parser, Debug)]
#[command(name = "ariatab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a page's tab widget in a real browser
    Check(CheckArgs),

    /// Audit the ARIA markup of an HTML file without a browser
    Audit(AuditArgs),

    /// Serve a directory over HTTP until interrupted
    Serve(ServeArgs),
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    ariatab_core::init_logging_with_default(if cli.verbose { "debug" } else { "info" });

    let result = match cli.command {
        Commands::Check(args) => commands::check::run(args).await,
        Commands::Audit(args) => commands::audit::run(args),
        Commands::Serve(args) => commands::serve::run(args).await,
    };

    match result {
        Ok(RunStatus::Passed) => ExitCode::SUCCESS,
        Ok(RunStatus::Failed) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
