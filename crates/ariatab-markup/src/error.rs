//! Markup audit error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid selector {selector}: {reason}")]
    Selector { selector: String, reason: String },
}
