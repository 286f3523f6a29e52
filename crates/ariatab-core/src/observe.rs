//! Reading the widget through a page host

use ariatab_host::{ElementHandle, PageHost, Result as HostResult};
use ariatab_widget::{normalize, parse_tabindex, Panel, Tab, WidgetSnapshot};
use std::collections::HashSet;
use tokio::time::{sleep, Instant};

use crate::config::Config;

/// Read one snapshot of the widget
pub async fn read_snapshot<H: PageHost>(host: &mut H, config: &Config) -> HostResult<WidgetSnapshot> {
    let mut snapshot = WidgetSnapshot::default();

    let containers = host.query_all(&config.tablist_selector).await?;
    if let Some(container) = containers.first() {
        snapshot.container_found = true;
        snapshot.container_role = host.attribute(container, "role").await?;
    }

    for handle in host.query_all(&config.tab_selector).await? {
        snapshot.tabs.push(read_tab(host, &handle).await?);
    }

    let mut seen = HashSet::new();
    for handle in host.query_all(&config.panel_selector).await? {
        let panel = read_panel(host, &handle).await?;
        if panel.id.is_empty() || seen.insert(panel.id.clone()) {
            snapshot.panels.push(panel);
        }
    }

    // Panels without a role are still reachable through aria-controls
    let controlled: Vec<String> = snapshot
        .tabs
        .iter()
        .filter_map(|t| t.controls.clone())
        .filter(|id| !id.is_empty() && !seen.contains(id))
        .collect();
    for id in controlled {
        let Some(selector) = id_selector(&id) else {
            continue;
        };
        if let Some(handle) = host.query_all(&selector).await?.first() {
            let panel = read_panel(host, handle).await?;
            if seen.insert(panel.id.clone()) {
                snapshot.panels.push(panel);
            }
        }
    }

    snapshot.focused_id = match host.focused().await? {
        Some(handle) => host
            .attribute(&handle, "id")
            .await?
            .filter(|id| !id.is_empty()),
        None => None,
    };

    tracing::debug!(
        tabs = snapshot.tabs.len(),
        panels = snapshot.panels.len(),
        state = %snapshot.describe(),
        "Snapshot"
    );

    Ok(snapshot)
}

async fn read_tab<H: PageHost>(host: &mut H, handle: &ElementHandle) -> HostResult<Tab> {
    Ok(Tab {
        id: host.attribute(handle, "id").await?.unwrap_or_default(),
        role: host.attribute(handle, "role").await?,
        label: accessible_name(host, handle).await?,
        aria_selected: host.attribute(handle, "aria-selected").await?,
        tabindex: parse_tabindex(host.attribute(handle, "tabindex").await?.as_deref()),
        controls: host.attribute(handle, "aria-controls").await?,
    })
}

async fn read_panel<H: PageHost>(host: &mut H, handle: &ElementHandle) -> HostResult<Panel> {
    Ok(Panel {
        id: host.attribute(handle, "id").await?.unwrap_or_default(),
        role: host.attribute(handle, "role").await?,
        labelled_by: host.attribute(handle, "aria-labelledby").await?,
        visible: host.is_visible(handle).await?,
    })
}

/// `aria-label`, else the text of the `aria-labelledby` elements, else the
/// element's own text
async fn accessible_name<H: PageHost>(host: &mut H, handle: &ElementHandle) -> HostResult<String> {
    if let Some(label) = host.attribute(handle, "aria-label").await? {
        let label = normalize(&label);
        if !label.is_empty() {
            return Ok(label);
        }
    }

    if let Some(ids) = host.attribute(handle, "aria-labelledby").await? {
        let mut parts = Vec::new();
        for id in ids.split_whitespace() {
            let Some(selector) = id_selector(id) else {
                continue;
            };
            if let Some(el) = host.query_all(&selector).await?.first() {
                parts.push(host.text(el).await?);
            }
        }
        let label = normalize(&parts.join(" "));
        if !label.is_empty() {
            return Ok(label);
        }
    }

    Ok(normalize(&host.text(handle).await?))
}

/// Attribute selector for an element id; `None` for ids that cannot be
/// quoted safely.
fn id_selector(id: &str) -> Option<String> {
    if id.contains(&['"', '\\'][..]) {
        return None;
    }
    Some(format!("[id=\"{id}\"]"))
}

/// Result of polling for a condition
#[derive(Debug)]
pub struct Observation {
    pub satisfied: bool,
    /// The last snapshot read
    pub snapshot: WidgetSnapshot,
}

/// Poll snapshots until `condition` holds or the interaction timeout elapses
pub async fn wait_until<H, F>(host: &mut H, config: &Config, condition: F) -> HostResult<Observation>
where
    H: PageHost,
    F: Fn(&WidgetSnapshot) -> bool,
{
    let deadline = Instant::now() + config.interaction_timeout();
    loop {
        let snapshot = read_snapshot(host, config).await?;
        if condition(&snapshot) {
            return Ok(Observation {
                satisfied: true,
                snapshot,
            });
        }
        if Instant::now() >= deadline {
            return Ok(Observation {
                satisfied: false,
                snapshot,
            });
        }
        sleep(config.poll_interval()).await;
    }
}

/// Poll snapshots for the whole interaction timeout, stopping at the first
/// one where `condition` does not hold
pub async fn holds_for<H, F>(host: &mut H, config: &Config, condition: F) -> HostResult<Observation>
where
    H: PageHost,
    F: Fn(&WidgetSnapshot) -> bool,
{
    let deadline = Instant::now() + config.interaction_timeout();
    loop {
        let snapshot = read_snapshot(host, config).await?;
        if !condition(&snapshot) {
            return Ok(Observation {
                satisfied: false,
                snapshot,
            });
        }
        if Instant::now() >= deadline {
            return Ok(Observation {
                satisfied: true,
                snapshot,
            });
        }
        sleep(config.poll_interval()).await;
    }
}
