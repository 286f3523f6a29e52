//! Tab and panel data structures
//!
//! Both are plain observations: the attribute values a host read off the
//! page at one moment. Missing attributes are kept as `None` so the checks
//! can tell "absent" apart from "wrong".

use serde::{Deserialize, Serialize};

pub const ROLE_TABLIST: &str = "tablist";
pub const ROLE_TAB: &str = "tab";
pub const ROLE_TABPANEL: &str = "tabpanel";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    /// DOM id, empty when the element carries none
    pub id: String,
    /// Value of the `role` attribute
    pub role: Option<String>,
    /// Accessible name
    pub label: String,
    /// `aria-selected`, `None` when the attribute is absent
    pub aria_selected: Option<String>,
    /// Parsed `tabindex`
    pub tabindex: Option<i32>,
    /// `aria-controls` target id
    pub controls: Option<String>,
}

impl Tab {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Some(ROLE_TAB.to_string()),
            label: label.into(),
            aria_selected: Some("false".to_string()),
            tabindex: None,
            controls: None,
        }
    }

    pub fn controlling(mut self, panel_id: impl Into<String>) -> Self {
        self.controls = Some(panel_id.into());
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.aria_selected = Some(selected.to_string());
        self
    }

    pub fn with_tabindex(mut self, tabindex: i32) -> Self {
        self.tabindex = Some(tabindex);
        self
    }

    /// Only the literal `"true"` counts as selected
    pub fn is_selected(&self) -> bool {
        self.aria_selected.as_deref() == Some("true")
    }

    pub fn has_role(&self) -> bool {
        self.role.as_deref() == Some(ROLE_TAB)
    }

    /// Reachable through the normal tab order.
    ///
    /// Tabs are usually buttons, so a missing attribute means focusable.
    pub fn in_tab_order(&self) -> bool {
        self.tabindex.map_or(true, |t| t >= 0)
    }

    /// Name used in report details
    pub fn display_name(&self) -> &str {
        if !self.id.is_empty() {
            &self.id
        } else if !self.label.is_empty() {
            &self.label
        } else {
            "<unnamed tab>"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub id: String,
    pub role: Option<String>,
    /// `aria-labelledby` back reference
    pub labelled_by: Option<String>,
    pub visible: bool,
}

impl Panel {
    pub fn new(id: impl Into<String>, labelled_by: impl Into<String>, visible: bool) -> Self {
        Self {
            id: id.into(),
            role: Some(ROLE_TABPANEL.to_string()),
            labelled_by: Some(labelled_by.into()),
            visible,
        }
    }

    pub fn has_role(&self) -> bool {
        self.role.as_deref() == Some(ROLE_TABPANEL)
    }
}

/// A tab the caller expects the widget to declare
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedTab {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ExpectedTab {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: None,
        }
    }

    pub fn with_id(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: Some(id.into()),
        }
    }
}

/// Parse a `tabindex` attribute the way browsers do: leading/trailing
/// whitespace ignored, anything non-numeric treated as absent.
pub fn parse_tabindex(raw: Option<&str>) -> Option<i32> {
    raw.and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_requires_literal_true() {
        let tab = Tab::new("tab-a", "A").selected(true);
        assert!(tab.is_selected());

        let mut tab = Tab::new("tab-a", "A");
        tab.aria_selected = Some("TRUE".to_string());
        assert!(!tab.is_selected());

        tab.aria_selected = None;
        assert!(!tab.is_selected());
    }

    #[test]
    fn test_tab_order() {
        assert!(Tab::new("a", "A").in_tab_order());
        assert!(Tab::new("a", "A").with_tabindex(0).in_tab_order());
        assert!(!Tab::new("a", "A").with_tabindex(-1).in_tab_order());
    }

    #[test]
    fn test_parse_tabindex() {
        assert_eq!(parse_tabindex(Some("0")), Some(0));
        assert_eq!(parse_tabindex(Some(" -1 ")), Some(-1));
        assert_eq!(parse_tabindex(Some("abc")), None);
        assert_eq!(parse_tabindex(None), None);
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(Tab::new("tab-a", "A").display_name(), "tab-a");
        assert_eq!(Tab::new("", "A").display_name(), "A");
        assert_eq!(Tab::new("", "").display_name(), "<unnamed tab>");
    }
}
