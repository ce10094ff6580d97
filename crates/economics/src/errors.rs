use thiserror::Error;

/// Errors raised before any allocation arithmetic runs.
#[derive(Debug, Error, PartialEq)]
pub enum EconomicsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl EconomicsError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
