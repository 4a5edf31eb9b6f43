//! Request handlers, one module per resource.

pub mod accounts;
pub mod bookings;
pub mod catalog;
pub mod health;
pub mod hotels;
pub mod metrics;

use common::AggregateId;

use crate::error::ApiError;

pub(crate) fn parse_aggregate_id(id: &str) -> Result<AggregateId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(AggregateId::from(uuid))
}
