//! Subcommand implementations

pub mod audit;
pub mod check;
pub mod serve;

pub use audit::AuditArgs;
pub use check::CheckArgs;
pub use serve::ServeArgs;

use ariatab_core::{Config, OutputFormat, WrapPolicy};
use clap::ValueEnum;
use std::path::Path;

/// How a subcommand finished when it did not error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    Failed,
}

impl RunStatus {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            RunStatus::Passed
        } else {
            RunStatus::Failed
        }
    }
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Wrap policy CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WrapArg {
    /// Next on the last tab goes to the first, Previous on the first to the last
    Wrap,
    /// Arrow keys stop at either end
    Clamp,
}

impl From<WrapArg> for WrapPolicy {
    fn from(arg: WrapArg) -> Self {
        match arg {
            WrapArg::Wrap => WrapPolicy::Wrap,
            WrapArg::Clamp => WrapPolicy::Clamp,
        }
    }
}

/// Config from `path`, or the defaults for the playground demo
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}

/// Write output to file or stdout
pub fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
