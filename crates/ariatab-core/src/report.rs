//! Conformance reports and their rendering
//!
//! Text is for people at a terminal, JSON for CI and other tools.

use ariatab_markup::MarkupAudit;
use ariatab_widget::{Orientation, WrapPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// The individual checks, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    Structure,
    Association,
    InitialState,
    RovingTabindex,
    Activation,
    KeyboardNavigation,
    Labels,
}

impl CheckKind {
    pub const ALL: [CheckKind; 7] = [
        CheckKind::Structure,
        CheckKind::Association,
        CheckKind::InitialState,
        CheckKind::RovingTabindex,
        CheckKind::Activation,
        CheckKind::KeyboardNavigation,
        CheckKind::Labels,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Structure => "structure",
            CheckKind::Association => "association",
            CheckKind::InitialState => "initial-state",
            CheckKind::RovingTabindex => "roving-tabindex",
            CheckKind::Activation => "activation",
            CheckKind::KeyboardNavigation => "keyboard-navigation",
            CheckKind::Labels => "labels",
        }
    }

    /// Failure kind this check reports
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            CheckKind::Structure => FailureKind::StructuralRoleError,
            CheckKind::Association => FailureKind::AssociationMismatchError,
            CheckKind::InitialState => FailureKind::SelectionInvariantError,
            CheckKind::RovingTabindex | CheckKind::KeyboardNavigation => {
                FailureKind::NavigationError
            }
            CheckKind::Activation => FailureKind::ActivationError,
            CheckKind::Labels => FailureKind::LabelMismatchError,
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    StructuralRoleError,
    AssociationMismatchError,
    SelectionInvariantError,
    ActivationError,
    NavigationError,
    LabelMismatchError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::StructuralRoleError => "StructuralRoleError",
            FailureKind::AssociationMismatchError => "AssociationMismatchError",
            FailureKind::SelectionInvariantError => "SelectionInvariantError",
            FailureKind::ActivationError => "ActivationError",
            FailureKind::NavigationError => "NavigationError",
            FailureKind::LabelMismatchError => "LabelMismatchError",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed { kind: FailureKind, detail: String },
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckKind,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl CheckResult {
    pub fn passed(check: CheckKind) -> Self {
        Self {
            check,
            outcome: Outcome::Passed,
        }
    }

    /// Failure with this check's kind; `findings` are joined into the detail
    pub fn failed(check: CheckKind, findings: &[String]) -> Self {
        Self {
            check,
            outcome: Outcome::Failed {
                kind: check.failure_kind(),
                detail: findings.join("; "),
            },
        }
    }

    /// Pass when there are no findings
    pub fn from_findings(check: CheckKind, findings: &[String]) -> Self {
        if findings.is_empty() {
            Self::passed(check)
        } else {
            Self::failed(check, findings)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub run_id: Uuid,
    /// Page the widget was loaded from
    pub url: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub wrap: WrapPolicy,
    pub orientation: Orientation,
    pub results: Vec<CheckResult>,
}

impl ConformanceReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_passed())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.outcome.is_passed())
    }

    pub fn result(&self, check: CheckKind) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.check == check)
    }

    /// Checks that failed, in run order
    pub fn failed_checks(&self) -> Vec<CheckKind> {
        self.failures().map(|r| r.check).collect()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

pub fn render_report(report: &ConformanceReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report_text(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

pub fn render_audit(audit: &MarkupAudit, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(audit_text(audit)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(audit)?),
    }
}

fn report_text(report: &ConformanceReport) -> String {
    let mut output = String::new();

    output.push_str("=== Tab Widget Conformance Report ===\n\n");
    output.push_str(&format!("Run:     {}\n", report.run_id));
    if let Some(url) = &report.url {
        output.push_str(&format!("Page:    {}\n", url));
    }
    output.push_str(&format!(
        "Policy:  wrap={} orientation={}\n",
        report.wrap, report.orientation
    ));
    let elapsed = report.finished_at - report.started_at;
    output.push_str(&format!("Elapsed: {} ms\n\n", elapsed.num_milliseconds()));

    for result in &report.results {
        match &result.outcome {
            Outcome::Passed => output.push_str(&format!("[PASS] {}\n", result.check)),
            Outcome::Failed { kind, detail } => {
                output.push_str(&format!("[FAIL] {} ({})\n", result.check, kind));
                for line in detail.split("; ") {
                    output.push_str(&format!("  - {}\n", line));
                }
            }
        }
    }

    let failed = report.failures().count();
    output.push('\n');
    if failed == 0 {
        output.push_str(&format!("RESULT: PASS ({} checks)\n", report.results.len()));
    } else {
        output.push_str(&format!(
            "RESULT: FAIL ({} of {} checks failed)\n",
            failed,
            report.results.len()
        ));
    }

    output
}

fn audit_text(audit: &MarkupAudit) -> String {
    let mut output = String::new();

    output.push_str("=== Tab Widget Markup Audit ===\n\n");
    if let Some(source) = &audit.source {
        output.push_str(&format!("File: {}\n\n", source));
    }

    for finding in &audit.findings {
        let mark = if finding.passed { "PASS" } else { "FAIL" };
        output.push_str(&format!("[{}] {}: {}\n", mark, finding.check, finding.detail));
    }

    if !audit.tabs.is_empty() {
        output.push_str("\nTab buttons:\n");
        for tab in &audit.tabs {
            output.push_str(&format!(
                "  {} \"{}\" aria-selected={} aria-controls={}\n",
                tab.display_name(),
                tab.label,
                tab.aria_selected.as_deref().unwrap_or("-"),
                tab.controls.as_deref().unwrap_or("-"),
            ));
        }
    }

    output.push('\n');
    if audit.passed() {
        output.push_str("RESULT: PASS\n");
    } else {
        output.push_str(&format!(
            "RESULT: FAIL ({} finding(s))\n",
            audit.failures().count()
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConformanceReport {
        let now = Utc::now();
        ConformanceReport {
            run_id: Uuid::new_v4(),
            url: None,
            started_at: now,
            finished_at: now,
            wrap: WrapPolicy::Wrap,
            orientation: Orientation::Horizontal,
            results: vec![
                CheckResult::passed(CheckKind::Structure),
                CheckResult::failed(
                    CheckKind::Activation,
                    &["tab 'tab-todo' not selected".to_string(), "panel 'todo' hidden".to_string()],
                ),
            ],
        }
        .with_url("http://127.0.0.1:8000/playground/index.html")
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            CheckKind::RovingTabindex.failure_kind(),
            FailureKind::NavigationError
        );
        assert_eq!(
            CheckKind::Structure.failure_kind(),
            FailureKind::StructuralRoleError
        );
        assert_eq!(CheckKind::ALL.len(), 7);
    }

    #[test]
    fn test_report_summary() {
        let report = sample();
        assert!(!report.passed());
        assert_eq!(report.failed_checks(), vec![CheckKind::Activation]);
        assert!(report.result(CheckKind::Labels).is_none());
    }

    #[test]
    fn test_text_rendering() {
        let text = render_report(&sample(), OutputFormat::Text).unwrap();
        assert!(text.contains("[PASS] structure"));
        assert!(text.contains("[FAIL] activation (ActivationError)"));
        assert!(text.contains("  - panel 'todo' hidden"));
        assert!(text.contains("RESULT: FAIL (1 of 2 checks failed)"));
    }

    #[test]
    fn test_json_rendering() {
        let json = render_report(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results"][0]["check"], "structure");
        assert_eq!(value["results"][0]["status"], "passed");
        assert_eq!(value["results"][1]["status"], "failed");
        assert_eq!(value["results"][1]["kind"], "ActivationError");
        assert_eq!(value["wrap"], "wrap");

        let back: ConformanceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.results, sample().results);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }
}
