//! Chrome page host over the DevTools protocol
//!
//! Launches a Chrome or Chromium process through `chromiumoxide`, opens
//! one page and drives it. Element handles are keyed by the DOM backend
//! node id, so querying the same element twice yields the same handle.

use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetFocusEmulationEnabledParams;
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use ariatab_widget::Key;

use crate::error::HostError;
use crate::host::{ElementHandle, PageHost};
use crate::Result;

/// Rendered and laid out, not hidden by the `hidden` attribute or CSS
const IS_VISIBLE_JS: &str = "function() { \
    if (this.hidden) { return false; } \
    const style = window.getComputedStyle(this); \
    if (style.display === 'none' || style.visibility === 'hidden') { return false; } \
    return this.getClientRects().length > 0; \
}";

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Chrome's sandbox; usually off inside containers
    pub sandbox: bool,
    /// Browser binary, auto-detected when `None`
    pub chrome_executable: Option<PathBuf>,
    pub window_size: (u32, u32),
    pub launch_timeout: Duration,
    /// Per-command timeout
    pub request_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chrome_executable: None,
            window_size: (1280, 800),
            launch_timeout: Duration::from_secs(20),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl BrowserConfig {
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    fn to_cdp(&self, user_data_dir: &std::path::Path) -> Result<CdpConfig> {
        let (width, height) = self.window_size;
        let mut builder = CdpConfig::builder()
            .window_size(width, height)
            .launch_timeout(self.launch_timeout)
            .request_timeout(self.request_timeout)
            .user_data_dir(user_data_dir);

        if !self.headless {
            builder = builder.with_head();
        }
        if !self.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = self.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(HostError::Launch)
    }
}

pub struct BrowserHost {
    browser: Browser,
    page: Page,
    handler: tokio::task::JoinHandle<()>,
    elements: HashMap<String, Element>,
    // Removed when the host is dropped
    _profile: tempfile::TempDir,
}

impl BrowserHost {
    /// Launch a browser with a fresh profile and open a blank page
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let profile = tempfile::Builder::new().prefix("ariatab-profile-").tempdir()?;
        let cdp_config = config.to_cdp(profile.path())?;

        tracing::info!(
            headless = config.headless,
            executable = ?config.chrome_executable,
            "Launching browser"
        );
        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| HostError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "Browser handler stopped");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        // `:focus` only matches in a focused window; headless windows never are
        page.execute(SetFocusEmulationEnabledParams::new(true)).await?;

        Ok(Self {
            browser,
            page,
            handler,
            elements: HashMap::new(),
            _profile: profile,
        })
    }

    /// Close the browser and wait for the process to exit
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        self.browser.wait().await?;
        self.handler.abort();
        tracing::info!("Browser closed");
        Ok(())
    }

    fn remember(&mut self, element: Element) -> ElementHandle {
        let handle = ElementHandle::new(format!("node:{}", element.backend_node_id.inner()));
        self.elements.insert(handle.as_str().to_string(), element);
        handle
    }

    fn element(&self, handle: &ElementHandle) -> Result<&Element> {
        self.elements
            .get(handle.as_str())
            .ok_or_else(|| HostError::UnknownElement(handle.to_string()))
    }
}

impl PageHost for BrowserHost {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.elements.clear();
        self.page
            .goto(url)
            .await
            .map_err(|e| HostError::Navigation(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>> {
        let found = self.page.find_elements(selector).await?;
        Ok(found.into_iter().map(|el| self.remember(el)).collect())
    }

    async fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        Ok(self.element(element)?.attribute(name).await?)
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String> {
        Ok(self.element(element)?.inner_text().await?.unwrap_or_default())
    }

    async fn is_visible(&mut self, element: &ElementHandle) -> Result<bool> {
        let returns = self.element(element)?.call_js_fn(IS_VISIBLE_JS, false).await?;
        Ok(returns
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    async fn focused(&mut self) -> Result<Option<ElementHandle>> {
        let found = self.page.find_elements(":focus").await?;
        Ok(found.into_iter().next().map(|el| self.remember(el)))
    }

    async fn focus(&mut self, element: &ElementHandle) -> Result<()> {
        self.element(element)?.focus().await?;
        Ok(())
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<()> {
        self.element(element)?.click().await?;
        Ok(())
    }

    async fn press_key(&mut self, key: Key) -> Result<()> {
        for event in key_events(key)? {
            self.page.execute(event).await?;
        }
        Ok(())
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let screenshot = self.page.execute(params).await?;
        Ok(base64::engine::general_purpose::STANDARD.decode(&screenshot.data)?)
    }
}

/// DOM `code`, Windows virtual key code and typed text of a key
fn key_definition(key: Key) -> (&'static str, i64, Option<&'static str>) {
    match key {
        Key::Tab => ("Tab", 9, None),
        Key::Enter => ("Enter", 13, Some("\r")),
        Key::Space => ("Space", 32, Some(" ")),
        Key::End => ("End", 35, None),
        Key::Home => ("Home", 36, None),
        Key::ArrowLeft => ("ArrowLeft", 37, None),
        Key::ArrowUp => ("ArrowUp", 38, None),
        Key::ArrowRight => ("ArrowRight", 39, None),
        Key::ArrowDown => ("ArrowDown", 40, None),
    }
}

/// Key down then key up, dispatched to the focused element
fn key_events(key: Key) -> Result<[DispatchKeyEventParams; 2]> {
    let (code, key_code, text) = key_definition(key);

    let mut down = DispatchKeyEventParams::builder()
        .key(key.as_str())
        .code(code)
        .windows_virtual_key_code(key_code)
        .native_virtual_key_code(key_code);
    down = match text {
        Some(text) => down.r#type(DispatchKeyEventType::KeyDown).text(text),
        None => down.r#type(DispatchKeyEventType::RawKeyDown),
    };

    let up = DispatchKeyEventParams::builder()
        .r#type(DispatchKeyEventType::KeyUp)
        .key(key.as_str())
        .code(code)
        .windows_virtual_key_code(key_code)
        .native_virtual_key_code(key_code);

    Ok([
        down.build().map_err(HostError::Input)?,
        up.build().map_err(HostError::Input)?,
    ])
}
