//! Saga error types.

use common::AggregateId;
use domain::TravelError;
use event_store::EventStoreError;
use thiserror::Error;

use crate::travel_booking::BookingStep;

#[derive(Debug, Error)]
pub enum SagaError {
    /// The booking request failed validation. Nothing was recorded.
    #[error(transparent)]
    InvalidRequest(#[from] TravelError),

    /// A saga already exists for this booking id.
    #[error("Booking {0} has already been started")]
    AlreadyStarted(AggregateId),

    #[error("Flight service error: {0}")]
    FlightService(String),

    #[error("Hotel service error: {0}")]
    HotelService(String),

    #[error("Car rental service error: {0}")]
    CarRentalService(String),

    /// A step or compensation did not finish within the configured timeout.
    #[error("Step '{step}' timed out after {timeout_ms}ms")]
    StepTimedOut { step: BookingStep, timeout_ms: u128 },

    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SagaError>;
