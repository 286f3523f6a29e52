//! Host error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("DevTools protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("Invalid input event: {0}")]
    Input(String),

    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Screenshot decode error: {0}")]
    Decode(#[from] base64::DecodeError),
}
