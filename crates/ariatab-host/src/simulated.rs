//! In-process tab widget
//!
//! [`SimulatedPage`] renders its tab widget to HTML on every query, matches
//! selectors against it with `scraper` and reacts to clicks and key presses
//! the way the playground widget does. [`Behavior`] switches individual
//! parts of the tabs pattern off so each conformance failure can be
//! reproduced without a browser.

use std::collections::BTreeMap;

use ariatab_widget::{Key, NavKey, Orientation, WrapPolicy};
use scraper::{Html, Selector};

use crate::error::HostError;
use crate::host::{ElementHandle, PageHost};
use crate::Result;

/// Carries the element handle in the rendered markup
const NODE_ATTR: &str = "data-ariatab-node";

/// A tab as declared by the page author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedTab {
    pub id: String,
    pub label: String,
    pub panel_id: String,
}

impl SimulatedTab {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        panel_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            panel_id: panel_id.into(),
        }
    }
}

/// Which parts of the tabs pattern the widget implements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Behavior {
    pub tablist_role: bool,
    pub tab_role: bool,
    pub panel_role: bool,
    pub aria_controls: bool,
    pub aria_labelledby: bool,
    pub click_activates: bool,
    /// Activating a tab clears `aria-selected` on the others
    pub deselect_previous: bool,
    pub hide_inactive_panels: bool,
    pub keyboard: bool,
    pub wrap: WrapPolicy,
    pub orientation: Orientation,
    /// Arrow keys move selection along with focus
    pub selection_follows_focus: bool,
    /// Keyboard selection also swaps the visible panel
    pub keyboard_swaps_panels: bool,
    pub roving_tabindex: bool,
    /// `tabindex="0"` follows keyboard focus
    pub keyboard_moves_tabindex: bool,
    /// Queries answered with nothing before the widget appears
    pub render_after_queries: u64,
    /// Queries before an interaction's effect becomes observable
    pub update_lag: u64,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            tablist_role: true,
            tab_role: true,
            panel_role: true,
            aria_controls: true,
            aria_labelledby: true,
            click_activates: true,
            deselect_previous: true,
            hide_inactive_panels: true,
            keyboard: true,
            wrap: WrapPolicy::Wrap,
            orientation: Orientation::Horizontal,
            selection_follows_focus: true,
            keyboard_swaps_panels: true,
            roving_tabindex: true,
            keyboard_moves_tabindex: true,
            render_after_queries: 0,
            update_lag: 0,
        }
    }
}

impl Behavior {
    /// A page whose widget never renders
    pub fn never_renders() -> Self {
        Self {
            render_after_queries: u64::MAX,
            ..Self::default()
        }
    }
}

/// Input the page received, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Navigate(String),
    Focus(String),
    Click(String),
    Key(Key),
}

#[derive(Debug, Clone, Copy)]
enum Change {
    Select(usize),
    /// Show one panel, hide the rest
    Show(usize),
    /// Move `tabindex="0"`
    TabStop(usize),
    Focus(usize),
}

#[derive(Debug)]
struct Element {
    handle: ElementHandle,
    tag: &'static str,
    attrs: BTreeMap<String, String>,
    text: String,
    visible: bool,
}

impl Element {
    fn to_html(&self, inner: &str) -> String {
        let attrs: String = self
            .attrs
            .iter()
            .map(|(name, value)| format!(" {name}=\"{}\"", escape(value)))
            .collect();
        format!(
            "<{tag}{attrs} {NODE_ATTR}=\"{handle}\">{inner}</{tag}>",
            tag = self.tag,
            handle = self.handle
        )
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Debug)]
enum Node {
    Container,
    Tab(usize),
    Panel(usize),
}

pub struct SimulatedPage {
    tabs: Vec<SimulatedTab>,
    behavior: Behavior,
    selected: Vec<bool>,
    shown: Vec<bool>,
    tab_stop: usize,
    focused: Option<usize>,
    queries: u64,
    pending: Vec<(u64, Change)>,
    url: Option<String>,
    interactions: Vec<Interaction>,
}

impl SimulatedPage {
    /// Widget with the first tab selected
    pub fn new(tabs: Vec<SimulatedTab>, behavior: Behavior) -> Self {
        let selected: Vec<bool> = (0..tabs.len()).map(|i| i == 0).collect();
        Self {
            tabs,
            behavior,
            shown: selected.clone(),
            selected,
            tab_stop: 0,
            focused: None,
            queries: 0,
            pending: Vec::new(),
            url: None,
            interactions: Vec::new(),
        }
    }

    /// The playground demo: Counter, Todo List, User Card, Fetch
    pub fn playground(behavior: Behavior) -> Self {
        Self::new(
            vec![
                SimulatedTab::new("tab-counter", "Counter", "counter"),
                SimulatedTab::new("tab-todo", "Todo List", "todo"),
                SimulatedTab::new("tab-user-card", "User Card", "user-card"),
                SimulatedTab::new("tab-fetch", "Fetch", "fetch"),
            ],
            behavior,
        )
    }

    pub fn behavior_mut(&mut self) -> &mut Behavior {
        &mut self.behavior
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Ids of tabs currently carrying `aria-selected="true"`
    pub fn selected_ids(&self) -> Vec<&str> {
        self.tabs
            .iter()
            .zip(&self.selected)
            .filter(|(_, s)| **s)
            .map(|(t, _)| t.id.as_str())
            .collect()
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.focused.map(|i| self.tabs[i].id.as_str())
    }

    /// Ids of panels currently shown
    pub fn shown_panel_ids(&self) -> Vec<&str> {
        self.tabs
            .iter()
            .zip(&self.shown)
            .filter(|(_, s)| **s)
            .map(|(t, _)| t.panel_id.as_str())
            .collect()
    }

    /// Select tab `index` directly, bypassing input handling
    pub fn select(&mut self, index: usize) {
        self.apply(Change::Select(index));
        self.apply(Change::Show(index));
        self.apply(Change::TabStop(index));
    }

    fn rendered(&self) -> bool {
        self.queries >= self.behavior.render_after_queries
    }

    fn tick(&mut self) {
        self.queries = self.queries.saturating_add(1);
        let now = self.queries;
        let (due, later): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|(at, _)| *at <= now);
        self.pending = later;
        for (_, change) in due {
            self.apply(change);
        }
    }

    fn schedule(&mut self, change: Change) {
        if self.behavior.update_lag == 0 {
            self.apply(change);
        } else {
            let due = self.queries.saturating_add(self.behavior.update_lag);
            self.pending.push((due, change));
        }
    }

    fn apply(&mut self, change: Change) {
        match change {
            Change::Focus(index) => self.focused = Some(index),
            Change::Show(index) => {
                for (i, shown) in self.shown.iter_mut().enumerate() {
                    *shown = i == index;
                }
            }
            Change::TabStop(index) => self.tab_stop = index,
            Change::Select(index) => {
                if self.behavior.deselect_previous {
                    self.selected.iter_mut().for_each(|s| *s = false);
                }
                self.selected[index] = true;
            }
        }
    }

    fn node(&self, handle: &ElementHandle) -> Result<Node> {
        let raw = handle.as_str();
        let index = |prefix: &str| -> Option<usize> {
            raw.strip_prefix(prefix)
                .and_then(|n| n.parse().ok())
                .filter(|n| *n < self.tabs.len())
        };

        if raw == "tablist" {
            Ok(Node::Container)
        } else if let Some(i) = index("tab:") {
            Ok(Node::Tab(i))
        } else if let Some(i) = index("panel:") {
            Ok(Node::Panel(i))
        } else {
            Err(HostError::UnknownElement(raw.to_string()))
        }
    }

    fn render_node(&self, node: &Node) -> Element {
        let b = &self.behavior;
        let mut attrs = BTreeMap::new();

        match *node {
            Node::Container => {
                attrs.insert("class".to_string(), "tabs".to_string());
                if b.tablist_role {
                    attrs.insert("role".to_string(), "tablist".to_string());
                }
                if b.orientation == Orientation::Vertical {
                    attrs.insert("aria-orientation".to_string(), "vertical".to_string());
                }
                Element {
                    handle: ElementHandle::new("tablist"),
                    tag: "div",
                    attrs,
                    text: self
                        .tabs
                        .iter()
                        .map(|t| t.label.as_str())
                        .collect::<Vec<_>>()
                        .join(" "),
                    visible: true,
                }
            }
            Node::Tab(i) => {
                let tab = &self.tabs[i];
                let selected = self.selected[i];
                let class = if selected { "tab active" } else { "tab" };
                attrs.insert("class".to_string(), class.to_string());
                attrs.insert("id".to_string(), tab.id.clone());
                if b.tab_role {
                    attrs.insert("role".to_string(), "tab".to_string());
                }
                attrs.insert("aria-selected".to_string(), selected.to_string());
                if b.aria_controls {
                    attrs.insert("aria-controls".to_string(), tab.panel_id.clone());
                }
                if b.roving_tabindex {
                    let tabindex = if i == self.tab_stop { "0" } else { "-1" };
                    attrs.insert("tabindex".to_string(), tabindex.to_string());
                }
                Element {
                    handle: ElementHandle::new(format!("tab:{i}")),
                    tag: "button",
                    attrs,
                    text: tab.label.clone(),
                    visible: true,
                }
            }
            Node::Panel(i) => {
                let tab = &self.tabs[i];
                attrs.insert("class".to_string(), "example".to_string());
                attrs.insert("id".to_string(), tab.panel_id.clone());
                if b.panel_role {
                    attrs.insert("role".to_string(), "tabpanel".to_string());
                }
                if b.aria_labelledby {
                    attrs.insert("aria-labelledby".to_string(), tab.id.clone());
                }
                let visible = self.shown[i] || !b.hide_inactive_panels;
                if !visible {
                    attrs.insert("hidden".to_string(), String::new());
                }
                Element {
                    handle: ElementHandle::new(format!("panel:{i}")),
                    tag: "div",
                    attrs,
                    text: format!("{} example", tab.label),
                    visible,
                }
            }
        }
    }

    /// The container holding its tabs, followed by the panels
    fn markup(&self) -> String {
        let n = self.tabs.len();
        let tabs: String = (0..n)
            .map(|i| {
                let tab = self.render_node(&Node::Tab(i));
                tab.to_html(&escape(&tab.text))
            })
            .collect();
        let panels: String = (0..n)
            .map(|i| {
                let panel = self.render_node(&Node::Panel(i));
                panel.to_html(&escape(&panel.text))
            })
            .collect();
        self.render_node(&Node::Container).to_html(&tabs) + &panels
    }

    fn element(&self, handle: &ElementHandle) -> Result<Element> {
        let node = self.node(handle)?;
        Ok(self.render_node(&node))
    }
}

impl PageHost for SimulatedPage {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.url = Some(url.to_string());
        self.interactions.push(Interaction::Navigate(url.to_string()));
        Ok(())
    }

    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>> {
        let selector = Selector::parse(selector)
            .map_err(|e| HostError::Selector(format!("{selector}: {e}")))?;
        self.tick();
        if !self.rendered() {
            return Ok(Vec::new());
        }

        let document = Html::parse_fragment(&self.markup());
        Ok(document
            .select(&selector)
            .filter_map(|el| el.value().attr(NODE_ATTR))
            .map(ElementHandle::new)
            .collect())
    }

    async fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        Ok(self.element(element)?.attrs.get(name).cloned())
    }

    async fn text(&mut self, element: &ElementHandle) -> Result<String> {
        Ok(self.element(element)?.text)
    }

    async fn is_visible(&mut self, element: &ElementHandle) -> Result<bool> {
        Ok(self.element(element)?.visible)
    }

    async fn focused(&mut self) -> Result<Option<ElementHandle>> {
        Ok(self.focused.map(|i| ElementHandle::new(format!("tab:{i}"))))
    }

    async fn focus(&mut self, element: &ElementHandle) -> Result<()> {
        self.interactions.push(Interaction::Focus(element.to_string()));
        match self.node(element)? {
            Node::Tab(i) => self.focused = Some(i),
            // Container and panels are not focusable in the demo
            Node::Container | Node::Panel(_) => self.focused = None,
        }
        Ok(())
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<()> {
        self.interactions.push(Interaction::Click(element.to_string()));
        if let Node::Tab(i) = self.node(element)? {
            self.focused = Some(i);
            if self.behavior.click_activates {
                self.schedule(Change::Select(i));
                self.schedule(Change::Show(i));
                self.schedule(Change::TabStop(i));
            }
        }
        Ok(())
    }

    async fn press_key(&mut self, key: Key) -> Result<()> {
        self.interactions.push(Interaction::Key(key));

        let Some(from) = self.focused else {
            return Ok(());
        };
        if !self.behavior.keyboard {
            return Ok(());
        }
        let Some(nav) = NavKey::from_key(key, self.behavior.orientation) else {
            return Ok(());
        };

        let target = nav.target(from, self.tabs.len(), self.behavior.wrap);
        self.schedule(Change::Focus(target));
        if self.behavior.keyboard_moves_tabindex {
            self.schedule(Change::TabStop(target));
        }
        if self.behavior.selection_follows_focus {
            self.schedule(Change::Select(target));
            if self.behavior.keyboard_swaps_panels {
                self.schedule(Change::Show(target));
            }
        }
        Ok(())
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>> {
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_renders_playground() {
        let mut page = SimulatedPage::playground(Behavior::default());
        let tabs = page.query_all("[role='tab']").await.unwrap();
        assert_eq!(tabs.len(), 4);
        let selected = page.attribute(&tabs[0], "aria-selected").await.unwrap();
        assert_eq!(selected.as_deref(), Some("true"));
        let panels = page.query_all("[role='tabpanel']").await.unwrap();
        assert!(page.is_visible(&panels[0]).await.unwrap());
        assert!(!page.is_visible(&panels[1]).await.unwrap());
    }

    #[tokio::test]
    async fn test_click_moves_selection() {
        let mut page = SimulatedPage::playground(Behavior::default());
        page.click(&ElementHandle::new("tab:1")).await.unwrap();
        assert_eq!(page.selected_ids(), vec!["tab-todo"]);
        assert_eq!(page.focused_id(), Some("tab-todo"));
    }

    #[tokio::test]
    async fn test_arrow_keys_respect_policy() {
        let mut page = SimulatedPage::playground(Behavior::default());
        page.focus(&ElementHandle::new("tab:3")).await.unwrap();
        page.press_key(Key::ArrowRight).await.unwrap();
        assert_eq!(page.focused_id(), Some("tab-counter"));

        let mut page = SimulatedPage::playground(Behavior {
            wrap: WrapPolicy::Clamp,
            ..Behavior::default()
        });
        page.focus(&ElementHandle::new("tab:3")).await.unwrap();
        page.press_key(Key::ArrowRight).await.unwrap();
        assert_eq!(page.focused_id(), Some("tab-fetch"));
    }

    #[tokio::test]
    async fn test_update_lag_defers_changes() {
        let mut page = SimulatedPage::playground(Behavior {
            update_lag: 2,
            ..Behavior::default()
        });
        page.click(&ElementHandle::new("tab:2")).await.unwrap();
        assert_eq!(page.selected_ids(), vec!["tab-counter"]);
        page.query_all(".tab").await.unwrap();
        assert_eq!(page.selected_ids(), vec!["tab-counter"]);
        page.query_all(".tab").await.unwrap();
        assert_eq!(page.selected_ids(), vec!["tab-user-card"]);
    }

    #[tokio::test]
    async fn test_never_renders() {
        let mut page = SimulatedPage::playground(Behavior::never_renders());
        assert!(page.query_all(".tab").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_selector_combinators() {
        let mut page = SimulatedPage::playground(Behavior::default());
        let tabs = page.query_all("[role='tablist'] .tab").await.unwrap();
        assert_eq!(tabs.len(), 4);
        assert_eq!(tabs[0], ElementHandle::new("tab:0"));

        let both = page.query_all(".tabs > button:first-child, #fetch").await.unwrap();
        assert_eq!(both, vec![ElementHandle::new("tab:0"), ElementHandle::new("panel:3")]);

        let selected = page.query_all(".tab[aria-selected=\"true\"]").await.unwrap();
        assert_eq!(selected, vec![ElementHandle::new("tab:0")]);
    }

    #[tokio::test]
    async fn test_invalid_selector() {
        let mut page = SimulatedPage::playground(Behavior::default());
        let err = page.query_all("[role=").await.unwrap_err();
        assert!(matches!(err, HostError::Selector(_)));
    }

    #[tokio::test]
    async fn test_hidden_panels_carry_attribute() {
        let mut page = SimulatedPage::playground(Behavior::default());
        let hidden = page.query_all("[role='tabpanel'][hidden]").await.unwrap();
        assert_eq!(hidden.len(), 3);
        assert_eq!(
            page.attribute(&ElementHandle::new("panel:0"), "hidden").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_keyboard_can_leave_panels_behind() {
        let mut page = SimulatedPage::playground(Behavior {
            keyboard_swaps_panels: false,
            ..Behavior::default()
        });
        page.focus(&ElementHandle::new("tab:0")).await.unwrap();
        page.press_key(Key::ArrowRight).await.unwrap();
        assert_eq!(page.selected_ids(), vec!["tab-todo"]);
        assert_eq!(page.shown_panel_ids(), vec!["counter"]);

        page.click(&ElementHandle::new("tab:2")).await.unwrap();
        assert_eq!(page.shown_panel_ids(), vec!["user-card"]);
    }

    #[tokio::test]
    async fn test_keyboard_can_leave_tabindex_behind() {
        let mut page = SimulatedPage::playground(Behavior {
            keyboard_moves_tabindex: false,
            ..Behavior::default()
        });
        page.focus(&ElementHandle::new("tab:0")).await.unwrap();
        page.press_key(Key::ArrowRight).await.unwrap();

        let todo = ElementHandle::new("tab:1");
        assert_eq!(page.attribute(&todo, "tabindex").await.unwrap().as_deref(), Some("-1"));
        let counter = ElementHandle::new("tab:0");
        assert_eq!(page.attribute(&counter, "tabindex").await.unwrap().as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_unknown_handle() {
        let mut page = SimulatedPage::playground(Behavior::default());
        let err = page.text(&ElementHandle::new("tab:9")).await.unwrap_err();
        assert!(matches!(err, HostError::UnknownElement(_)));
    }
}
