//! Scoped run: static server, browser, check, teardown
//!
//! The server and the browser are released on every path out of
//! [`Harness::run`], whether the check passed, failed or never started.

use ariatab_host::{BrowserConfig, BrowserHost, PageHost, StaticServer};
use std::path::{Path, PathBuf};

use crate::checker::Checker;
use crate::error::CoreError;
use crate::report::ConformanceReport;
use crate::Result;

#[derive(Debug, Clone)]
pub struct Harness {
    /// Directory served over HTTP
    pub root: PathBuf,
    /// Page to load, relative to `root`
    pub page: String,
    pub browser: BrowserConfig,
    /// Where to save a PNG of the page after checking
    pub screenshot: Option<PathBuf>,
}

impl Harness {
    pub fn new(root: impl Into<PathBuf>, page: impl Into<String>, browser: BrowserConfig) -> Self {
        Self {
            root: root.into(),
            page: page.into(),
            browser,
            screenshot: None,
        }
    }

    pub fn with_screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot = Some(path.into());
        self
    }

    pub async fn run(&self, checker: &Checker) -> Result<ConformanceReport> {
        let server = StaticServer::start_local(&self.root)
            .await
            .map_err(|e| CoreError::Setup(format!("could not serve {}: {e}", self.root.display())))?;

        let result = match server.url_for(&self.page) {
            Ok(url) => self.run_session(checker, url.as_str()).await,
            Err(e) => Err(CoreError::Setup(format!("bad page path {}: {e}", self.page))),
        };

        server.shutdown().await;
        result
    }

    async fn run_session(&self, checker: &Checker, url: &str) -> Result<ConformanceReport> {
        let mut host = BrowserHost::launch(&self.browser)
            .await
            .map_err(|e| CoreError::Setup(format!("could not launch the browser: {e}")))?;

        let result = run_on(&mut host, checker, url, self.screenshot.as_deref()).await;

        if let Err(e) = host.close().await {
            tracing::warn!(error = %e, "Failed to close the browser");
        }
        result
    }
}

/// Load `url` in `host`, check it and optionally save a screenshot
pub async fn run_on<H: PageHost>(
    host: &mut H,
    checker: &Checker,
    url: &str,
    screenshot: Option<&Path>,
) -> Result<ConformanceReport> {
    tracing::info!(url = %url, "Loading page");
    host.navigate(url)
        .await
        .map_err(|e| CoreError::Setup(format!("could not load {url}: {e}")))?;

    let report = checker.check(host).await?.with_url(url);

    if let Some(path) = screenshot {
        match host.screenshot().await {
            Ok(png) => match std::fs::write(path, png) {
                Ok(()) => tracing::info!(path = %path.display(), "Screenshot saved"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to save screenshot"),
            },
            Err(e) => tracing::warn!(error = %e, "Failed to take screenshot"),
        }
    }

    Ok(report)
}
