//! ariatab Page Hosts
//!
//! The checker never talks to a browser directly. It drives a [`PageHost`]:
//! - [`BrowserHost`] launches Chrome and drives it over the DevTools protocol
//! - [`SimulatedPage`] is an in-process tab widget with injectable defects
//!
//! [`StaticServer`] serves the page under test from a local directory.

mod browser;
mod error;
mod host;
mod server;
mod simulated;

pub use browser::{BrowserConfig, BrowserHost};
pub use error::HostError;
pub use host::{ElementHandle, PageHost};
pub use server::StaticServer;
pub use simulated::{Behavior, Interaction, SimulatedPage, SimulatedTab};

pub use ariatab_widget::Key;

pub type Result<T> = std::result::Result<T, HostError>;
