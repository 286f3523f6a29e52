//! `ariatab check`

use ariatab_core::{render_report, BrowserConfig, Checker, Harness};
use clap::Args;
use std::path::PathBuf;

use super::{load_config, write_output, FormatArg, RunStatus, WrapArg};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Directory to serve
    #[arg(long)]
    pub root: PathBuf,

    /// Page to load, relative to the root
    #[arg(long)]
    pub page: String,

    /// What the widget does at either end of the tab list (overrides the config)
    #[arg(long, value_enum)]
    pub wrap: Option<WrapArg>,

    /// Chrome or Chromium binary (auto-detected if not specified)
    #[arg(long)]
    pub chrome: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable Chrome's sandbox (needed in most containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: FormatArg,

    /// Output file (stdout if not specified)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Save a screenshot of the page after checking
    #[arg(long)]
    pub screenshot: Option<PathBuf>,
}

impl CheckArgs {
    fn browser(&self) -> BrowserConfig {
        let mut browser = BrowserConfig::default().with_headless(!self.headed);
        if self.no_sandbox {
            browser = browser.with_no_sandbox();
        }
        if let Some(path) = &self.chrome {
            browser = browser.with_chrome_executable(path);
        }
        browser
    }
}

pub async fn run(args: CheckArgs) -> anyhow::Result<RunStatus> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(wrap) = args.wrap {
        config = config.with_wrap(wrap.into());
    }
    let checker = Checker::new(config)?;

    let mut harness = Harness::new(&args.root, &args.page, args.browser());
    if let Some(path) = &args.screenshot {
        harness = harness.with_screenshot(path);
    }

    let report = harness.run(&checker).await?;
    write_output(
        &render_report(&report, args.format.into())?,
        args.output.as_deref(),
    )?;

    Ok(RunStatus::from_passed(report.passed()))
}
