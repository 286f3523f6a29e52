//! Widget model error types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WidgetError {
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Unknown wrap policy: {0}")]
    UnknownWrapPolicy(String),

    #[error("Unknown orientation: {0}")]
    UnknownOrientation(String),
}
