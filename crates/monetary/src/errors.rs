use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the simulation core.
///
/// Only configuration problems reach the caller; numeric drift is clamped
/// and feed outages fall back to synthetic signals.
#[derive(Debug, Error)]
pub enum MonetaryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl MonetaryError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// External feed or dashboard failure. Never escapes the simulation loop.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("external feed unavailable: {0}")]
    Unavailable(String),
}

#[cfg(feature = "live-feed")]
impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}
