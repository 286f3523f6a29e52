//! ariatab Core
//!
//! Conformance checking for ARIA tab widgets: configuration, the checker
//! that drives a page host through the tabs pattern, reports, and the
//! harness that owns the server and browser session for a run.

mod checker;
mod config;
mod error;
mod harness;
mod observe;
mod report;

pub use checker::Checker;
pub use config::Config;
pub use error::CoreError;
pub use harness::{run_on, Harness};
pub use observe::{holds_for, read_snapshot, wait_until, Observation};
pub use report::{
    render_audit, render_report, CheckKind, CheckResult, ConformanceReport, FailureKind,
    OutputFormat, Outcome,
};

pub use ariatab_host::{
    Behavior, BrowserConfig, BrowserHost, ElementHandle, HostError, Interaction, PageHost,
    SimulatedPage, SimulatedTab, StaticServer,
};
pub use ariatab_markup::{audit_file, audit_html, AuditOptions, Finding, MarkupAudit, MarkupError};
pub use ariatab_widget::{
    ExpectedTab, Key, NavKey, Orientation, Panel, Tab, WidgetSnapshot, WrapPolicy,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with a default filter used when `RUST_LOG` is unset.
///
/// Logs go to stderr; stdout carries reports.
pub fn init_logging_with_default(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
