//! ariatab Widget Model
//!
//! Describes one observation of an ARIA tabs widget (tab list, tabs, panels,
//! focus) and evaluates the tabs-pattern invariants over it.
//! Everything here is pure; reading a live page is the host's job.

mod error;
mod navigation;
mod snapshot;
mod tab;

pub use error::WidgetError;
pub use navigation::{Key, NavKey, Orientation, WrapPolicy};
pub use snapshot::{normalize, RoleViolation, WidgetSnapshot};
pub use tab::{
    parse_tabindex, ExpectedTab, Panel, Tab, ROLE_TAB, ROLE_TABLIST, ROLE_TABPANEL,
};

pub type Result<T> = std::result::Result<T, WidgetError>;
