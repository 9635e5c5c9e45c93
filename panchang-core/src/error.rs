//! Error types for Panchang data acquisition.

use thiserror::Error;

/// Errors that can occur while acquiring Panchang data.
///
/// `Clone` so a single failed token refresh can be handed to every caller
/// waiting on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanchangError {
    /// Credential issuance or refresh failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The provider answered, but not with usable calendar data.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Durable storage is unavailable. Never surfaced past the cache.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for PanchangError {
    fn from(e: std::io::Error) -> Self {
        PanchangError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for PanchangError {
    fn from(e: serde_json::Error) -> Self {
        PanchangError::Serialization(e.to_string())
    }
}

/// Result type alias for Panchang operations.
pub type PanchangResult<T> = Result<T, PanchangError>;
