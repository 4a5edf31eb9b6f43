//! Domain error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::account::AccountError;

/// Errors surfaced by command handling.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// A billing command was rejected by the account aggregate.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    #[error("Aggregate not found: {aggregate_type} with id {aggregate_id}")]
    AggregateNotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
