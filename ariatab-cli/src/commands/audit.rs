//! `ariatab audit`

use ariatab_core::{audit_file, render_audit};
use clap::Args;
use std::path::PathBuf;

use super::{load_config, write_output, FormatArg, RunStatus};

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// HTML file to audit
    pub html: PathBuf,

    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: FormatArg,

    /// Output file (stdout if not specified)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: AuditArgs) -> anyhow::Result<RunStatus> {
    let config = load_config(args.config.as_deref())?;
    let audit = audit_file(&args.html, &config.audit_options())?;

    tracing::info!(
        file = %args.html.display(),
        tabs = audit.tabs.len(),
        failures = audit.failures().count(),
        "Markup audit finished"
    );

    write_output(&render_audit(&audit, args.format.into())?, args.output.as_deref())?;
    Ok(RunStatus::from_passed(audit.passed()))
}
