//! Page host abstraction
//!
//! The narrow surface the checker needs from a browser-automation backend.
//! All calls are sequential; a host serves exactly one actor.

use ariatab_widget::Key;

use crate::Result;

/// Opaque reference to an element on the page.
///
/// Only meaningful to the host that returned it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[allow(async_fn_in_trait)]
pub trait PageHost {
    /// Load `url` and wait for the document to finish loading
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// All elements matching a CSS selector, in document order
    async fn query_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(&mut self, element: &ElementHandle, name: &str) -> Result<Option<String>>;

    /// Rendered text content
    async fn text(&mut self, element: &ElementHandle) -> Result<String>;

    async fn is_visible(&mut self, element: &ElementHandle) -> Result<bool>;

    /// Element holding DOM focus, if it is not the document body
    async fn focused(&mut self) -> Result<Option<ElementHandle>>;

    /// Move focus without activating
    async fn focus(&mut self, element: &ElementHandle) -> Result<()>;

    /// Pointer activation
    async fn click(&mut self, element: &ElementHandle) -> Result<()>;

    /// Press and release a key on the focused element
    async fn press_key(&mut self, key: Key) -> Result<()>;

    /// PNG screenshot of the viewport
    async fn screenshot(&mut self) -> Result<Vec<u8>>;
}
