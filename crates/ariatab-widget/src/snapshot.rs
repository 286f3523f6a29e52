//! Widget snapshot and invariant evaluation
//!
//! A [`WidgetSnapshot`] is everything the checker knows about the widget at
//! one instant. Each `*_violations` method evaluates one part of the tabs
//! pattern and returns human-readable findings (empty means conforming).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::tab::{ExpectedTab, Panel, Tab, ROLE_TAB, ROLE_TABLIST, ROLE_TABPANEL};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSnapshot {
    /// Whether any tab list container was located
    pub container_found: bool,
    /// `role` of the container
    pub container_role: Option<String>,
    /// Tabs in document order
    pub tabs: Vec<Tab>,
    pub panels: Vec<Panel>,
    /// Id of the element holding DOM focus
    pub focused_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleViolation {
    pub element: String,
    pub expected: String,
    pub found: Option<String>,
}

impl std::fmt::Display for RoleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.found {
            Some(found) => write!(
                f,
                "{}: expected role=\"{}\", found role=\"{}\"",
                self.element, self.expected, found
            ),
            None => write!(
                f,
                "{}: expected role=\"{}\", found no role",
                self.element, self.expected
            ),
        }
    }
}

impl WidgetSnapshot {
    pub fn tab(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| !t.id.is_empty() && t.id == id)
    }

    pub fn tab_index(&self, id: &str) -> Option<usize> {
        self.tabs.iter().position(|t| !t.id.is_empty() && t.id == id)
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id == id)
    }

    pub fn selected_tabs(&self) -> Vec<&Tab> {
        self.tabs.iter().filter(|t| t.is_selected()).collect()
    }

    /// Index of the selected tab, only when exactly one is selected
    pub fn selected_index(&self) -> Option<usize> {
        let mut selected = self
            .tabs
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_selected());
        match (selected.next(), selected.next()) {
            (Some((index, _)), None) => Some(index),
            _ => None,
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_index().map(|i| self.tabs[i].id.as_str())
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused_id.as_deref().and_then(|id| self.tab_index(id))
    }

    /// Panel associated with `tab`, through `aria-controls` or, failing
    /// that, a panel that names the tab in `aria-labelledby`.
    pub fn panel_for(&self, tab: &Tab) -> Option<&Panel> {
        tab.controls
            .as_deref()
            .and_then(|id| self.panel(id))
            .or_else(|| {
                if tab.id.is_empty() {
                    return None;
                }
                self.panels
                    .iter()
                    .find(|p| p.labelled_by.as_deref() == Some(tab.id.as_str()))
            })
    }

    pub fn visible_panel_ids(&self) -> Vec<&str> {
        self.panels
            .iter()
            .filter(|p| p.visible)
            .map(|p| p.id.as_str())
            .collect()
    }

    /// Short description of the observable state for failure details
    pub fn describe(&self) -> String {
        let selected: Vec<&str> = self
            .selected_tabs()
            .iter()
            .map(|t| t.display_name())
            .collect();
        format!(
            "selected=[{}] focused={} visible=[{}]",
            selected.join(", "),
            self.focused_id.as_deref().unwrap_or("<none>"),
            self.visible_panel_ids().join(", ")
        )
    }

    /// Missing or wrong `tablist` / `tab` / `tabpanel` roles
    pub fn role_violations(&self) -> Vec<RoleViolation> {
        let mut violations = Vec::new();

        if !self.container_found {
            violations.push(RoleViolation {
                element: "tab list container".to_string(),
                expected: ROLE_TABLIST.to_string(),
                found: None,
            });
        } else if self.container_role.as_deref() != Some(ROLE_TABLIST) {
            violations.push(RoleViolation {
                element: "tab list container".to_string(),
                expected: ROLE_TABLIST.to_string(),
                found: self.container_role.clone(),
            });
        }

        for tab in self.tabs.iter().filter(|t| !t.has_role()) {
            violations.push(RoleViolation {
                element: format!("tab '{}'", tab.display_name()),
                expected: ROLE_TAB.to_string(),
                found: tab.role.clone(),
            });
        }

        for panel in self.panels.iter().filter(|p| !p.has_role()) {
            violations.push(RoleViolation {
                element: format!("panel '{}'", panel.id),
                expected: ROLE_TABPANEL.to_string(),
                found: panel.role.clone(),
            });
        }

        violations
    }

    /// `aria-controls` / `aria-labelledby` must pair tabs and panels 1:1
    pub fn association_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut controllers: HashMap<&str, Vec<&str>> = HashMap::new();

        for tab in &self.tabs {
            if tab.id.is_empty() {
                violations.push(format!(
                    "tab '{}' has no id, so no panel can reference it",
                    tab.display_name()
                ));
            }

            let Some(panel_id) = tab.controls.as_deref().filter(|c| !c.is_empty()) else {
                violations.push(format!("tab '{}' has no aria-controls", tab.display_name()));
                continue;
            };

            controllers
                .entry(panel_id)
                .or_default()
                .push(tab.display_name());

            match self.panel(panel_id) {
                None => violations.push(format!(
                    "tab '{}' controls '{}', which does not exist",
                    tab.display_name(),
                    panel_id
                )),
                Some(panel) => match panel.labelled_by.as_deref() {
                    None => violations.push(format!(
                        "panel '{}' has no aria-labelledby, expected '{}'",
                        panel.id, tab.id
                    )),
                    Some(label) if label != tab.id => violations.push(format!(
                        "panel '{}' is labelled by '{}', expected '{}'",
                        panel.id, label, tab.id
                    )),
                    Some(_) => {}
                },
            }
        }

        let mut shared: Vec<_> = controllers.iter().filter(|(_, t)| t.len() > 1).collect();
        shared.sort();
        for (panel_id, tabs) in shared {
            violations.push(format!(
                "panel '{}' is controlled by more than one tab: {}",
                panel_id,
                tabs.join(", ")
            ));
        }

        for panel in &self.panels {
            if !controllers.contains_key(panel.id.as_str()) {
                violations.push(format!("panel '{}' is not controlled by any tab", panel.id));
            }
        }

        violations
    }

    /// Exactly one selected tab; its panel alone is visible
    pub fn selection_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let selected = self.selected_tabs();
        if selected.len() != 1 {
            let ids: Vec<&str> = selected.iter().map(|t| t.display_name()).collect();
            violations.push(format!(
                "expected exactly one tab with aria-selected=\"true\", found {} [{}]",
                selected.len(),
                ids.join(", ")
            ));
        }

        for tab in &self.tabs {
            let Some(panel) = self.panel_for(tab) else {
                continue;
            };
            if tab.is_selected() && !panel.visible {
                violations.push(format!(
                    "panel '{}' of selected tab '{}' is hidden",
                    panel.id,
                    tab.display_name()
                ));
            } else if !tab.is_selected() && panel.visible {
                violations.push(format!(
                    "panel '{}' of unselected tab '{}' is visible",
                    panel.id,
                    tab.display_name()
                ));
            }
        }

        violations
    }

    /// Roving tabindex: only the selected tab sits in the tab order
    pub fn roving_tabindex_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for tab in &self.tabs {
            let shown = tab
                .tabindex
                .map_or_else(|| "no tabindex".to_string(), |t| format!("tabindex=\"{t}\""));
            if tab.is_selected() && !tab.in_tab_order() {
                violations.push(format!(
                    "selected tab '{}' has {}, expected tabindex=\"0\"",
                    tab.display_name(),
                    shown
                ));
            } else if !tab.is_selected() && tab.in_tab_order() {
                violations.push(format!(
                    "unselected tab '{}' has {}, expected tabindex=\"-1\"",
                    tab.display_name(),
                    shown
                ));
            }
        }

        violations
    }

    /// Accessible names are non-empty and match the expected tab set.
    ///
    /// Names compare after whitespace normalisation; order is not
    /// significant, ids are when given.
    pub fn label_violations(&self, expected: &[ExpectedTab]) -> Vec<String> {
        let mut violations = Vec::new();

        for tab in &self.tabs {
            if normalize(&tab.label).is_empty() {
                violations.push(format!(
                    "tab '{}' has an empty accessible name",
                    tab.display_name()
                ));
            }
        }

        if expected.is_empty() {
            return violations;
        }

        let actual: Vec<String> = self.tabs.iter().map(|t| normalize(&t.label)).collect();
        let wanted: Vec<String> = expected.iter().map(|e| normalize(&e.label)).collect();

        for label in &wanted {
            if !actual.contains(label) {
                violations.push(format!("expected tab '{}' not found", label));
            }
        }
        for (tab, label) in self.tabs.iter().zip(&actual) {
            if !label.is_empty() && !wanted.contains(label) {
                violations.push(format!(
                    "unexpected tab '{}' named '{}'",
                    tab.display_name(),
                    label
                ));
            }
        }

        for entry in expected {
            let Some(id) = entry.id.as_deref() else {
                continue;
            };
            match self.tab(id) {
                None => violations.push(format!("expected tab id '{}' not found", id)),
                Some(tab) if normalize(&tab.label) != normalize(&entry.label) => {
                    violations.push(format!(
                        "tab '{}' is named '{}', expected '{}'",
                        id,
                        normalize(&tab.label),
                        normalize(&entry.label)
                    ))
                }
                Some(_) => {}
            }
        }

        violations
    }
}

/// Collapse runs of whitespace and trim
pub fn normalize(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> WidgetSnapshot {
        let tabs = [
            ("tab-counter", "Counter", "counter"),
            ("tab-todo", "Todo List", "todo"),
            ("tab-user-card", "User Card", "user-card"),
            ("tab-fetch", "Fetch", "fetch"),
        ];
        WidgetSnapshot {
            container_found: true,
            container_role: Some("tablist".to_string()),
            tabs: tabs
                .iter()
                .enumerate()
                .map(|(i, (id, label, panel))| {
                    Tab::new(*id, *label)
                        .controlling(*panel)
                        .selected(i == 0)
                        .with_tabindex(if i == 0 { 0 } else { -1 })
                })
                .collect(),
            panels: tabs
                .iter()
                .enumerate()
                .map(|(i, (id, _, panel))| Panel::new(*panel, *id, i == 0))
                .collect(),
            focused_id: None,
        }
    }

    fn expected() -> Vec<ExpectedTab> {
        vec![
            ExpectedTab::with_id("tab-counter", "Counter"),
            ExpectedTab::with_id("tab-todo", "Todo List"),
            ExpectedTab::with_id("tab-user-card", "User Card"),
            ExpectedTab::with_id("tab-fetch", "Fetch"),
        ]
    }

    #[test]
    fn test_conforming_widget_has_no_violations() {
        let snap = demo();
        assert!(snap.role_violations().is_empty());
        assert!(snap.association_violations().is_empty());
        assert!(snap.selection_violations().is_empty());
        assert!(snap.roving_tabindex_violations().is_empty());
        assert!(snap.label_violations(&expected()).is_empty());
        assert_eq!(snap.selected_index(), Some(0));
        assert_eq!(snap.selected_id(), Some("tab-counter"));
    }

    #[test]
    fn test_missing_tablist_role() {
        let mut snap = demo();
        snap.container_role = None;
        let violations = snap.role_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].expected, "tablist");
        // Nothing else is affected
        assert!(snap.association_violations().is_empty());
        assert!(snap.selection_violations().is_empty());
    }

    #[test]
    fn test_missing_container() {
        let mut snap = demo();
        snap.container_found = false;
        let violations = snap.role_violations();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().contains("found no role"));
    }

    #[test]
    fn test_wrong_tab_and_panel_roles() {
        let mut snap = demo();
        snap.tabs[1].role = Some("button".to_string());
        snap.panels[2].role = None;
        let violations: Vec<String> =
            snap.role_violations().iter().map(|v| v.to_string()).collect();
        assert_eq!(violations.len(), 2);
        assert!(violations[0].contains("tab 'tab-todo'"));
        assert!(violations[0].contains("found role=\"button\""));
        assert!(violations[1].contains("panel 'user-card'"));
    }

    #[test]
    fn test_association_round_trip() {
        let mut snap = demo();
        snap.panels[1].labelled_by = Some("tab-counter".to_string());
        let violations = snap.association_violations();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("panel 'todo' is labelled by 'tab-counter'"));
    }

    #[test]
    fn test_association_dangling_and_shared() {
        let mut snap = demo();
        snap.tabs[3].controls = Some("nowhere".to_string());
        let violations = snap.association_violations();
        assert!(violations.iter().any(|v| v.contains("'nowhere', which does not exist")));
        assert!(violations
            .iter()
            .any(|v| v.contains("panel 'fetch' is not controlled by any tab")));

        let mut snap = demo();
        snap.tabs[1].controls = Some("counter".to_string());
        let violations = snap.association_violations();
        assert!(violations
            .iter()
            .any(|v| v.contains("panel 'counter' is controlled by more than one tab")));
    }

    #[test]
    fn test_selection_invariant() {
        let mut snap = demo();
        snap.tabs[2] = snap.tabs[2].clone().selected(true);
        let violations = snap.selection_violations();
        assert!(violations[0].contains("found 2"));
        assert_eq!(snap.selected_index(), None);

        let mut snap = demo();
        snap.panels[3].visible = true;
        let violations = snap.selection_violations();
        assert_eq!(
            violations,
            vec!["panel 'fetch' of unselected tab 'tab-fetch' is visible".to_string()]
        );

        let mut snap = demo();
        snap.tabs[0] = snap.tabs[0].clone().selected(false);
        assert!(snap.selection_violations()[0].contains("found 0"));
    }

    #[test]
    fn test_panel_lookup_falls_back_to_labelledby() {
        let mut snap = demo();
        snap.tabs[0].controls = None;
        let panel = snap.panel_for(&snap.tabs[0]).unwrap();
        assert_eq!(panel.id, "counter");
    }

    #[test]
    fn test_roving_tabindex() {
        let mut snap = demo();
        snap.tabs[1].tabindex = None;
        snap.tabs[0].tabindex = Some(-1);
        let violations = snap.roving_tabindex_violations();
        assert_eq!(violations.len(), 2);
        assert!(violations[0].contains("selected tab 'tab-counter' has tabindex=\"-1\""));
        assert!(violations[1].contains("unselected tab 'tab-todo' has no tabindex"));
    }

    #[test]
    fn test_labels() {
        let mut snap = demo();
        snap.tabs[1].label = "  Todo\n   List ".to_string();
        assert!(snap.label_violations(&expected()).is_empty());

        snap.tabs[2].label = String::new();
        snap.tabs[3].label = "Fetcher".to_string();
        let violations = snap.label_violations(&expected());
        assert!(violations.contains(&"tab 'tab-user-card' has an empty accessible name".to_string()));
        assert!(violations.contains(&"expected tab 'Fetch' not found".to_string()));
        assert!(violations.contains(&"unexpected tab 'tab-fetch' named 'Fetcher'".to_string()));
        assert!(violations
            .contains(&"tab 'tab-fetch' is named 'Fetcher', expected 'Fetch'".to_string()));
    }

    #[test]
    fn test_labels_without_expectations() {
        let snap = demo();
        assert!(snap.label_violations(&[]).is_empty());
    }

    #[test]
    fn test_describe() {
        let mut snap = demo();
        snap.focused_id = Some("tab-counter".to_string());
        assert_eq!(
            snap.describe(),
            "selected=[tab-counter] focused=tab-counter visible=[counter]"
        );
    }

    #[test]
    fn test_serde_round_trip_of_snapshot() {
        let snap = demo();
        let json = serde_json::to_string(&snap).unwrap();
        let back: WidgetSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
