//! Static audit of a tab widget page

use ariatab_widget::{normalize, parse_tabindex, Tab};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::MarkupError;
use crate::Result;

/// Keyboard handler registration the demo playground script carries
pub const KEYDOWN_LISTENER_SNIPPET: &str =
    "document.querySelector('.tabs').addEventListener('keydown'";

/// Deselection step of the playground's tab switch
pub const DESELECT_SNIPPET: &str = "t.setAttribute('aria-selected', 'false')";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditOptions {
    /// Selector for tab buttons; roles first, styling class as fallback
    pub tab_selector: String,
    /// Literal strings the page source must contain
    pub required_snippets: Vec<String>,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            tab_selector: "[role='tab'], .tab".to_string(),
            required_snippets: vec![
                KEYDOWN_LISTENER_SNIPPET.to_string(),
                DESELECT_SNIPPET.to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub check: String,
    pub passed: bool,
    pub detail: String,
}

impl Finding {
    fn pass(check: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(check: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            passed: false,
            detail: detail.into(),
        }
    }

    fn from_bool(check: &str, passed: bool, detail: String) -> Self {
        if passed {
            Self::pass(check, detail)
        } else {
            Self::fail(check, detail)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkupAudit {
    /// File the markup was read from
    pub source: Option<String>,
    /// Tab buttons in document order
    pub tabs: Vec<Tab>,
    pub selected_count: usize,
    pub findings: Vec<Finding>,
}

impl MarkupAudit {
    pub fn passed(&self) -> bool {
        self.findings.iter().all(|f| f.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.passed)
    }

    /// First finding for `check`
    pub fn finding(&self, check: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.check == check)
    }
}

/// Read and audit an HTML file
pub fn audit_file(path: impl AsRef<Path>, options: &AuditOptions) -> Result<MarkupAudit> {
    let path = path.as_ref();
    let html = std::fs::read_to_string(path)?;
    let mut audit = audit_html(&html, options)?;
    audit.source = Some(path.display().to_string());
    Ok(audit)
}

pub fn audit_html(html: &str, options: &AuditOptions) -> Result<MarkupAudit> {
    let document = Html::parse_document(html);
    let mut findings = Vec::new();

    for (check, selector) in [
        ("tablist-role", "[role='tablist']"),
        ("tab-role", "[role='tab']"),
        ("aria-selected", "[aria-selected]"),
        ("tabpanel-role", "[role='tabpanel']"),
    ] {
        let count = document.select(&parse_selector(selector)?).count();
        findings.push(if count > 0 {
            Finding::pass(check, format!("{count} element(s) match {selector}"))
        } else {
            Finding::fail(check, format!("nothing matches {selector}"))
        });
    }

    let tab_selector = parse_selector(&options.tab_selector)?;
    let tabs: Vec<Tab> = document
        .select(&tab_selector)
        .map(|el| read_tab(&document, el))
        .collect();

    let names: Vec<&str> = tabs.iter().map(Tab::display_name).collect();
    findings.push(Finding::from_bool(
        "tab-buttons",
        !tabs.is_empty(),
        format!("{} tab button(s): [{}]", tabs.len(), names.join(", ")),
    ));

    findings.push(controls_finding(&document, &tabs));

    let selected: Vec<&str> = tabs
        .iter()
        .filter(|t| t.is_selected())
        .map(Tab::display_name)
        .collect();
    findings.push(Finding::from_bool(
        "initial-selection",
        selected.len() == 1,
        format!(
            "{} tab(s) start with aria-selected=\"true\": [{}]",
            selected.len(),
            selected.join(", ")
        ),
    ));

    for snippet in &options.required_snippets {
        let found = html.contains(snippet.as_str());
        let detail = if found {
            format!("found `{snippet}`")
        } else {
            format!("missing `{snippet}`")
        };
        findings.push(Finding::from_bool("snippet", found, detail));
    }

    let audit = MarkupAudit {
        source: None,
        selected_count: selected.len(),
        tabs,
        findings,
    };

    tracing::debug!(
        tabs = audit.tabs.len(),
        failures = audit.failures().count(),
        "Markup audited"
    );

    Ok(audit)
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| MarkupError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn element_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    let any_id = Selector::parse("[id]").ok()?;
    document
        .select(&any_id)
        .find(|el| el.value().id() == Some(id))
}

fn text_of(el: ElementRef<'_>) -> String {
    normalize(&el.text().collect::<String>())
}

fn read_tab(document: &Html, el: ElementRef<'_>) -> Tab {
    let attr = |name: &str| el.value().attr(name).map(str::to_string);

    let label = attr("aria-label")
        .map(|l| normalize(&l))
        .filter(|l| !l.is_empty())
        .or_else(|| {
            let ids = attr("aria-labelledby")?;
            let parts: Vec<String> = ids
                .split_whitespace()
                .filter_map(|id| element_by_id(document, id))
                .map(text_of)
                .collect();
            Some(parts.join(" ")).filter(|l| !l.is_empty())
        })
        .unwrap_or_else(|| text_of(el));

    Tab {
        id: el.value().id().unwrap_or_default().to_string(),
        role: attr("role"),
        label,
        aria_selected: attr("aria-selected"),
        tabindex: parse_tabindex(el.value().attr("tabindex")),
        controls: attr("aria-controls"),
    }
}

fn controls_finding(document: &Html, tabs: &[Tab]) -> Finding {
    let mut problems = Vec::new();
    for tab in tabs {
        match tab.controls.as_deref() {
            None | Some("") => problems.push(format!("{} has no aria-controls", tab.display_name())),
            Some(target) if element_by_id(document, target).is_none() => {
                problems.push(format!("{} -> #{target} does not exist", tab.display_name()))
            }
            Some(_) => {}
        }
    }

    if tabs.is_empty() {
        Finding::fail("controls-targets", "no tabs to check")
    } else if problems.is_empty() {
        Finding::pass(
            "controls-targets",
            format!("all {} aria-controls targets exist", tabs.len()),
        )
    } else {
        Finding::fail("controls-targets", problems.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        <div class="tabs" role="tablist">
          <button class="tab active" id="tab-a" role="tab" aria-selected="true" aria-controls="a">Alpha</button>
          <button class="tab" id="tab-b" role="tab" aria-selected="false" aria-controls="b" tabindex="-1">
            Beta
          </button>
        </div>
        <section id="a" role="tabpanel" aria-labelledby="tab-a"></section>
        <section id="b" role="tabpanel" aria-labelledby="tab-b" hidden></section>
    "#;

    fn no_snippets() -> AuditOptions {
        AuditOptions {
            required_snippets: Vec::new(),
            ..AuditOptions::default()
        }
    }

    #[test]
    fn test_minimal_widget_passes() {
        let audit = audit_html(MINIMAL, &no_snippets()).unwrap();
        assert!(audit.passed(), "{:?}", audit.failures().collect::<Vec<_>>());
        assert_eq!(audit.tabs.len(), 2);
        assert_eq!(audit.tabs[1].label, "Beta");
        assert_eq!(audit.tabs[1].tabindex, Some(-1));
        assert_eq!(audit.selected_count, 1);
    }

    #[test]
    fn test_label_sources() {
        let html = r#"
            <span id="name">Named  elsewhere</span>
            <button role="tab" aria-label="Explicit">ignored</button>
            <button role="tab" aria-labelledby="name">ignored</button>
            <button role="tab" aria-label="  ">Visible</button>
        "#;
        let audit = audit_html(html, &no_snippets()).unwrap();
        let labels: Vec<&str> = audit.tabs.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Explicit", "Named elsewhere", "Visible"]);
    }

    #[test]
    fn test_dangling_controls() {
        let html = MINIMAL.replace(r#"aria-controls="b""#, r#"aria-controls="gone""#);
        let audit = audit_html(&html, &no_snippets()).unwrap();
        let finding = audit.finding("controls-targets").unwrap();
        assert!(!finding.passed);
        assert!(finding.detail.contains("tab-b -> #gone"));
    }

    #[test]
    fn test_selection_count() {
        let html = MINIMAL.replace(r#"aria-selected="false""#, r#"aria-selected="true""#);
        let audit = audit_html(&html, &no_snippets()).unwrap();
        assert_eq!(audit.selected_count, 2);
        assert!(!audit.finding("initial-selection").unwrap().passed);
    }

    #[test]
    fn test_class_fallback_without_roles() {
        let html = r#"<div class="tabs"><button class="tab">One</button></div>"#;
        let audit = audit_html(html, &no_snippets()).unwrap();
        assert_eq!(audit.tabs.len(), 1);
        assert_eq!(audit.tabs[0].role, None);
        assert!(!audit.finding("tab-role").unwrap().passed);
        assert!(!audit.finding("tablist-role").unwrap().passed);
        assert!(audit.finding("tab-buttons").unwrap().passed);
    }

    #[test]
    fn test_missing_snippets() {
        let audit = audit_html(MINIMAL, &AuditOptions::default()).unwrap();
        let snippets: Vec<&Finding> = audit
            .findings
            .iter()
            .filter(|f| f.check == "snippet")
            .collect();
        assert_eq!(snippets.len(), 2);
        assert!(snippets.iter().all(|f| !f.passed));
    }

    #[test]
    fn test_bad_selector() {
        let options = AuditOptions {
            tab_selector: "[role=".to_string(),
            ..AuditOptions::default()
        };
        assert!(matches!(
            audit_html(MINIMAL, &options),
            Err(MarkupError::Selector { .. })
        ));
    }
}
