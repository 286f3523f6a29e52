//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// The page could not be brought to a checkable state
    #[error("Setup error: {0}")]
    Setup(String),

    #[error("Host error: {0}")]
    Host(#[from] ariatab_host::HostError),

    #[error("Markup error: {0}")]
    Markup(#[from] ariatab_markup::MarkupError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
