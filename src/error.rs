use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    /// Duplicate phone number, carrying the offending number.
    #[error("رقم الموبايل {phone} مسجل بالفعل")]
    AlreadyRegistered { phone: String },

    #[error("No unassigned registrants found")]
    NothingToGroup,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Registration failed: {0}")]
    Registration(String),

    #[error("فشل في إنشاء المجموعة")]
    GroupCreation,

    #[error("Incorrect admin PIN")]
    InvalidPin,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
