//! ariatab Markup Audit
//!
//! Static presence checks over a page's HTML source: ARIA roles and
//! attributes of the tab widget, `aria-controls` targets, and snippets the
//! page script is expected to contain. Nothing is rendered or executed.

mod audit;
mod error;

pub use audit::{
    audit_file, audit_html, AuditOptions, Finding, MarkupAudit, DESELECT_SNIPPET,
    KEYDOWN_LISTENER_SNIPPET,
};
pub use error::MarkupError;

pub type Result<T> = std::result::Result<T, MarkupError>;
