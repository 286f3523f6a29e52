//! Tab widget conformance checker
//!
//! Runs every check against a loaded page and collects the outcomes in a
//! [`ConformanceReport`]. Checks never stop each other: a failing or
//! erroring check is recorded and the next one runs. Only a page that
//! never shows a tab aborts the run.

use ariatab_host::{PageHost, Result as HostResult};
use ariatab_widget::{NavKey, WidgetSnapshot, WrapPolicy};
use chrono::Utc;
use tokio::time::{sleep, Instant};
use uuid::Uuid;

use crate::config::Config;
use crate::error::CoreError;
use crate::observe::{holds_for, read_snapshot, wait_until};
use crate::report::{CheckKind, CheckResult, ConformanceReport, Outcome};
use crate::Result;

pub struct Checker {
    config: Config,
    wrap: WrapPolicy,
}

impl Checker {
    /// Fails on an invalid config or one without a wrap policy
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let wrap = config.wrap_policy()?;
        Ok(Self { config, wrap })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check the widget on the page `host` has loaded.
    ///
    /// Returns `Err` only when no tab appears within the setup timeout.
    pub async fn check<H: PageHost>(&self, host: &mut H) -> Result<ConformanceReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        tracing::info!(
            run_id = %run_id,
            wrap = %self.wrap,
            orientation = %self.config.orientation,
            "Conformance check started"
        );

        self.wait_for_widget(host).await?;

        let mut results = Vec::with_capacity(CheckKind::ALL.len());
        for check in CheckKind::ALL {
            let result = match self.run_check(check, host).await {
                Ok(findings) => CheckResult::from_findings(check, &findings),
                Err(e) => CheckResult::failed(check, &[format!("host error: {e}")]),
            };

            match &result.outcome {
                Outcome::Passed => tracing::info!(check = %check, "Check passed"),
                Outcome::Failed { kind, detail } => {
                    tracing::warn!(check = %check, kind = %kind, detail = %detail, "Check failed")
                }
            }
            results.push(result);
        }

        let report = ConformanceReport {
            run_id,
            url: None,
            started_at,
            finished_at: Utc::now(),
            wrap: self.wrap,
            orientation: self.config.orientation,
            results,
        };

        tracing::info!(
            run_id = %run_id,
            passed = report.passed(),
            failed = report.failures().count(),
            "Conformance check finished"
        );

        Ok(report)
    }

    /// Poll until at least one tab is present
    async fn wait_for_widget<H: PageHost>(&self, host: &mut H) -> Result<()> {
        let timeout = self.config.setup_timeout();
        let deadline = Instant::now() + timeout;

        loop {
            let tabs = host
                .query_all(&self.config.tab_selector)
                .await
                .map_err(|e| CoreError::Setup(format!("could not query the page: {e}")))?;
            if !tabs.is_empty() {
                tracing::debug!(tabs = tabs.len(), "Widget present");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(CoreError::Setup(format!(
                    "no element matching {} appeared within {} ms",
                    self.config.tab_selector,
                    timeout.as_millis()
                )));
            }
            sleep(self.config.poll_interval()).await;
        }
    }

    async fn run_check<H: PageHost>(&self, check: CheckKind, host: &mut H) -> HostResult<Vec<String>> {
        tracing::debug!(check = %check, "Running check");
        match check {
            CheckKind::Structure => {
                let snapshot = read_snapshot(host, &self.config).await?;
                Ok(snapshot
                    .role_violations()
                    .iter()
                    .map(ToString::to_string)
                    .collect())
            }
            CheckKind::Association => {
                Ok(read_snapshot(host, &self.config).await?.association_violations())
            }
            CheckKind::InitialState => {
                Ok(read_snapshot(host, &self.config).await?.selection_violations())
            }
            CheckKind::RovingTabindex => {
                Ok(read_snapshot(host, &self.config)
                    .await?
                    .roving_tabindex_violations())
            }
            CheckKind::Activation => self.check_activation(host).await,
            CheckKind::KeyboardNavigation => self.check_keyboard(host).await,
            CheckKind::Labels => Ok(read_snapshot(host, &self.config)
                .await?
                .label_violations(&self.config.expected_tabs)),
        }
    }

    /// Click a tab that is not selected, then click the previous one again
    async fn check_activation<H: PageHost>(&self, host: &mut H) -> HostResult<Vec<String>> {
        let before = read_snapshot(host, &self.config).await?;
        let previous = before.selected_index();

        let target = match &self.config.activation_target {
            Some(id) => match before.tab_index(id) {
                Some(index) => index,
                None => return Ok(vec![format!("activation target '{id}' not found")]),
            },
            None => match before.tabs.iter().position(|t| !t.is_selected()) {
                Some(index) => index,
                None => return Ok(vec!["no unselected tab to activate".to_string()]),
            },
        };
        if previous == Some(target) {
            return Ok(vec![format!(
                "activation target '{}' is already selected",
                before.tabs[target].display_name()
            )]);
        }

        let mut findings = self.activate(host, &before, target, previous).await?;

        // Round trip back to the original selection
        if let Some(previous) = previous {
            findings.extend(self.activate(host, &before, previous, Some(target)).await?);
        }

        Ok(findings)
    }

    /// Click tab `target` and wait for it to become the only selected tab
    async fn activate<H: PageHost>(
        &self,
        host: &mut H,
        before: &WidgetSnapshot,
        target: usize,
        previous: Option<usize>,
    ) -> HostResult<Vec<String>> {
        let name = before.tabs[target].display_name().to_string();
        let handles = host.query_all(&self.config.tab_selector).await?;
        let Some(handle) = handles.get(target) else {
            return Ok(vec![format!("tab '{name}' disappeared before it could be clicked")]);
        };

        tracing::debug!(tab = %name, "Clicking tab");
        host.click(handle).await?;

        let observation = wait_until(host, &self.config, |s| {
            activation_findings(s, target, previous).is_empty()
        })
        .await?;

        Ok(activation_findings(&observation.snapshot, target, previous)
            .into_iter()
            .map(|f| format!("after clicking '{name}': {f}"))
            .collect())
    }

    /// Walk the tab list with the keyboard, including both boundaries
    async fn check_keyboard<H: PageHost>(&self, host: &mut H) -> HostResult<Vec<String>> {
        let before = read_snapshot(host, &self.config).await?;
        let len = before.tabs.len();
        if len == 0 {
            return Ok(vec!["no tabs to navigate".to_string()]);
        }

        let policy = self.wrap;
        let original = before.selected_index();
        let start = original.unwrap_or(0);
        let last = len - 1;

        let plan = [
            (NavKey::Next, start),
            (NavKey::Last, NavKey::Next.target(start, len, policy)),
            (NavKey::Next, last),
            (NavKey::First, NavKey::Next.target(last, len, policy)),
            (NavKey::Previous, 0),
        ];

        // Panels and tabindex are only held to following the keyboard when
        // they followed the selection before any key was pressed
        let tracked = Tracked {
            panels: panels_follow_selection(&before),
            tabindex: before.roving_tabindex_violations().is_empty(),
        };

        let mut findings = Vec::new();
        for (nav, from) in plan {
            if let Some(finding) = self.transition(host, &before, tracked, nav, from).await? {
                findings.push(finding);
            }
        }

        if let Some(original) = original {
            if let Some(finding) = self.restore(host, &before, original).await? {
                findings.push(finding);
            }
        }

        Ok(findings)
    }

    /// Focus tab `from`, press the key for `nav` and check where focus and
    /// selection end up
    async fn transition<H: PageHost>(
        &self,
        host: &mut H,
        before: &WidgetSnapshot,
        tracked: Tracked,
        nav: NavKey,
        from: usize,
    ) -> HostResult<Option<String>> {
        let len = before.tabs.len();
        let policy = self.wrap;
        let key = nav.key(self.config.orientation);
        let from_name = before.tabs[from].display_name();

        let handles = host.query_all(&self.config.tab_selector).await?;
        let Some(handle) = handles.get(from) else {
            return Ok(Some(format!("{nav} from '{from_name}': tab disappeared")));
        };
        host.focus(handle).await?;

        let focused = read_snapshot(host, &self.config).await?;
        if focused.focused_index() != Some(from) {
            return Ok(Some(format!(
                "{nav} from '{from_name}': could not focus the start tab, observed {}",
                focused.describe()
            )));
        }

        tracing::debug!(nav = %nav, key = %key, from = %from_name, "Pressing key");
        host.press_key(key).await?;

        if policy == WrapPolicy::Clamp && nav.is_boundary(from, len) {
            let selected = focused.selected_index();
            let panels = focused.visible_panel_ids();
            let observation = holds_for(host, &self.config, |s| {
                s.focused_index() == Some(from)
                    && s.selected_index() == selected
                    && s.visible_panel_ids() == panels
            })
            .await?;
            if observation.satisfied {
                return Ok(None);
            }
            return Ok(Some(format!(
                "{nav} ({key}) from '{from_name}' at the boundary: expected no change, observed {}",
                observation.snapshot.describe()
            )));
        }

        let expected = nav.target(from, len, policy);
        let observation = wait_until(host, &self.config, |s| {
            navigation_findings(s, expected, tracked).is_empty()
        })
        .await?;
        if observation.satisfied {
            return Ok(None);
        }
        Ok(Some(format!(
            "{nav} ({key}) from '{from_name}': {}",
            navigation_findings(&observation.snapshot, expected, tracked).join("; ")
        )))
    }

    /// Re-select the tab that was selected before navigation started.
    ///
    /// Clicks it, and if that does not take, arrows onto it from a
    /// neighbour. Later checks read the widget in whatever state this
    /// leaves, so a failure is reported.
    async fn restore<H: PageHost>(
        &self,
        host: &mut H,
        before: &WidgetSnapshot,
        original: usize,
    ) -> HostResult<Option<String>> {
        let name = before.tabs[original].display_name();
        let restored = |s: &WidgetSnapshot| s.selected_index() == Some(original);

        let handles = host.query_all(&self.config.tab_selector).await?;
        if let Some(handle) = handles.get(original) {
            host.click(handle).await?;
        }
        let mut observation = wait_until(host, &self.config, restored).await?;

        let len = before.tabs.len();
        let neighbour = if original > 0 {
            Some((original - 1, NavKey::Next))
        } else if len > 1 {
            Some((1, NavKey::Previous))
        } else {
            None
        };
        if let (false, Some((from, nav))) = (observation.satisfied, neighbour) {
            tracing::debug!(tab = %name, "Click did not restore the selection, using the keyboard");
            let handles = host.query_all(&self.config.tab_selector).await?;
            if let Some(handle) = handles.get(from) {
                host.focus(handle).await?;
                host.press_key(nav.key(self.config.orientation)).await?;
                observation = wait_until(host, &self.config, restored).await?;
            }
        }

        if observation.satisfied {
            return Ok(None);
        }
        tracing::warn!(
            tab = %name,
            state = %observation.snapshot.describe(),
            "Original selection not restored"
        );
        Ok(Some(format!(
            "could not restore the selection to '{name}', observed {}",
            observation.snapshot.describe()
        )))
    }
}

/// Which invariants a keyboard transition must keep besides focus and
/// selection
#[derive(Debug, Clone, Copy)]
struct Tracked {
    panels: bool,
    tabindex: bool,
}

/// Exactly one panel is visible and it belongs to the selected tab
fn panels_follow_selection(snapshot: &WidgetSnapshot) -> bool {
    let Some(selected) = snapshot.selected_index() else {
        return false;
    };
    match snapshot.panel_for(&snapshot.tabs[selected]) {
        Some(panel) => snapshot.visible_panel_ids() == [panel.id.as_str()],
        None => false,
    }
}

/// Unmet post-conditions of a key press that should land on `expected`
fn navigation_findings(snapshot: &WidgetSnapshot, expected: usize, tracked: Tracked) -> Vec<String> {
    let Some(tab) = snapshot.tabs.get(expected) else {
        return vec![format!("tab #{} is gone", expected + 1)];
    };

    let mut findings = Vec::new();
    if snapshot.focused_index() != Some(expected) || snapshot.selected_index() != Some(expected) {
        findings.push(format!(
            "expected focus and selection on '{}', observed {}",
            tab.display_name(),
            snapshot.describe()
        ));
    }

    if tracked.panels {
        match snapshot.panel_for(tab) {
            None => findings.push(format!("'{}' has no panel", tab.display_name())),
            Some(panel) => {
                let visible = snapshot.visible_panel_ids();
                if visible != [panel.id.as_str()] {
                    findings.push(format!(
                        "expected only panel '{}' visible, observed [{}]",
                        panel.id,
                        visible.join(", ")
                    ));
                }
            }
        }
    }

    if tracked.tabindex {
        findings.extend(snapshot.roving_tabindex_violations());
    }

    findings
}

/// Unmet post-conditions of activating `target` while `previous` was
/// selected
fn activation_findings(
    snapshot: &WidgetSnapshot,
    target: usize,
    previous: Option<usize>,
) -> Vec<String> {
    let mut findings = Vec::new();

    let Some(tab) = snapshot.tabs.get(target) else {
        return vec![format!("tab #{} is gone", target + 1)];
    };
    if !tab.is_selected() {
        findings.push(format!(
            "expected '{}' aria-selected=\"true\", observed {}",
            tab.display_name(),
            shown(tab.aria_selected.as_deref())
        ));
    }
    match snapshot.panel_for(tab) {
        None => findings.push(format!("'{}' has no panel", tab.display_name())),
        Some(panel) if !panel.visible => findings.push(format!(
            "expected panel '{}' visible, observed hidden",
            panel.id
        )),
        Some(_) => {}
    }

    if let Some(prev) = previous.and_then(|i| snapshot.tabs.get(i)) {
        if prev.is_selected() {
            findings.push(format!(
                "expected '{}' aria-selected=\"false\", observed \"true\"",
                prev.display_name()
            ));
        }
        if let Some(panel) = snapshot.panel_for(prev).filter(|p| p.visible) {
            findings.push(format!(
                "expected panel '{}' hidden, observed visible",
                panel.id
            ));
        }
    }

    let selected = snapshot.selected_tabs();
    if selected.len() != 1 {
        let names: Vec<&str> = selected.iter().map(|t| t.display_name()).collect();
        findings.push(format!(
            "expected exactly one selected tab, observed {} [{}]",
            selected.len(),
            names.join(", ")
        ));
    }

    findings
}

fn shown(value: Option<&str>) -> String {
    value.map_or_else(|| "no attribute".to_string(), |v| format!("\"{v}\""))
}
