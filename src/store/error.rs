//! Error types for the store abstraction layer

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique constraint violation (PostgreSQL 23505)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// HTTP transport failure
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Store rejected the request
    #[error("Store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this error is a uniqueness violation. Orchestrators branch on
    /// this to translate duplicate phone numbers into `AlreadyRegistered`.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}
