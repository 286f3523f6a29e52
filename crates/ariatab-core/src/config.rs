//! Checker configuration

use ariatab_markup::{AuditOptions, DESELECT_SNIPPET, KEYDOWN_LISTENER_SNIPPET};
use ariatab_widget::{ExpectedTab, Orientation, WrapPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tab list container; role first, styling class as fallback
    pub tablist_selector: String,
    pub tab_selector: String,
    pub panel_selector: String,
    /// Tabs the widget must declare. Empty skips the set comparison.
    pub expected_tabs: Vec<ExpectedTab>,
    /// Tab id clicked by the activation check
    pub activation_target: Option<String>,
    /// What the widget does at either end of the tab list. Required to
    /// run the checker; the markup audit does not use it.
    pub wrap: Option<WrapPolicy>,
    pub orientation: Orientation,
    pub interaction_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub setup_timeout_ms: u64,
    /// Source strings the markup audit requires
    pub required_snippets: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tablist_selector: "[role='tablist'], .tabs".to_string(),
            tab_selector: "[role='tab'], .tab".to_string(),
            panel_selector: "[role='tabpanel']".to_string(),
            expected_tabs: vec![
                ExpectedTab::with_id("tab-counter", "Counter"),
                ExpectedTab::with_id("tab-todo", "Todo List"),
                ExpectedTab::with_id("tab-user-card", "User Card"),
                ExpectedTab::with_id("tab-fetch", "Fetch"),
            ],
            activation_target: None,
            wrap: None,
            orientation: Orientation::Horizontal,
            interaction_timeout_ms: 2000,
            poll_interval_ms: 50,
            setup_timeout_ms: 10_000,
            required_snippets: vec![
                KEYDOWN_LISTENER_SNIPPET.to_string(),
                DESELECT_SNIPPET.to_string(),
            ],
        }
    }
}

impl Config {
    /// Read a JSON config file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("tablist_selector", &self.tablist_selector),
            ("tab_selector", &self.tab_selector),
            ("panel_selector", &self.panel_selector),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!("{name} must not be empty")));
            }
        }

        if self.poll_interval_ms == 0 {
            return Err(CoreError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for id in self.expected_tabs.iter().filter_map(|t| t.id.as_deref()) {
            if !seen.insert(id) {
                return Err(CoreError::Config(format!(
                    "expected tab id '{id}' is listed twice"
                )));
            }
        }

        Ok(())
    }

    pub fn with_wrap(mut self, wrap: WrapPolicy) -> Self {
        self.wrap = Some(wrap);
        self
    }

    /// The configured wrap policy; there is no fallback
    pub fn wrap_policy(&self) -> Result<WrapPolicy> {
        self.wrap.ok_or_else(|| {
            CoreError::Config(
                "wrap policy is not set: use \"wrap\" or \"clamp\" to match the widget".to_string(),
            )
        })
    }

    pub fn interaction_timeout(&self) -> Duration {
        Duration::from_millis(self.interaction_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn setup_timeout(&self) -> Duration {
        Duration::from_millis(self.setup_timeout_ms)
    }

    pub fn audit_options(&self) -> AuditOptions {
        AuditOptions {
            tab_selector: self.tab_selector.clone(),
            required_snippets: self.required_snippets.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_describe_playground() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.expected_tabs.len(), 4);
        assert_eq!(config.wrap, None);
        assert_eq!(config.interaction_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_json() {
        let config: Config =
            serde_json::from_str(r#"{ "wrap": "clamp", "expected_tabs": [{ "label": "One" }] }"#)
                .unwrap();
        assert_eq!(config.wrap, Some(WrapPolicy::Clamp));
        assert_eq!(config.expected_tabs, vec![ExpectedTab::new("One")]);
        assert_eq!(config.tab_selector, "[role='tab'], .tab");
        assert_eq!(config.poll_interval_ms, 50);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.poll_interval_ms = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = Config::default();
        config.tab_selector = "  ".to_string();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = Config::default();
        config
            .expected_tabs
            .push(ExpectedTab::with_id("tab-todo", "Todo again"));
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_wrap_policy_required() {
        let config: Config = serde_json::from_str(r#"{ "orientation": "vertical" }"#).unwrap();
        assert!(matches!(config.wrap_policy(), Err(CoreError::Config(_))));

        let config = config.with_wrap(WrapPolicy::Clamp);
        assert_eq!(config.wrap_policy().unwrap(), WrapPolicy::Clamp);

        let unknown = serde_json::from_str::<Config>(r#"{ "wrap": "bounce" }"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ariatab.json");
        std::fs::write(&path, r#"{ "orientation": "vertical", "setup_timeout_ms": 500 }"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.orientation, Orientation::Vertical);
        assert_eq!(config.setup_timeout(), Duration::from_millis(500));

        std::fs::write(&path, r#"{ "poll_interval_ms": 0 }"#).unwrap();
        assert!(Config::load(&path).is_err());
        assert!(Config::load(dir.path().join("missing.json")).is_err());
    }
}
