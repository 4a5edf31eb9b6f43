//! Catalog error types.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Check-out is not after check-in.
    #[error("Invalid stay: check-out {check_out} must be after check-in {check_in}")]
    InvalidStay {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored JSON column did not match the hotel shape.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
