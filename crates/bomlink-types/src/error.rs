use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("empty identifier")]
    Empty,

    #[error("invalid element reference: {0}")]
    InvalidElement(String),
}
