//! Flight booking service.

use std::time::Duration;

use async_trait::async_trait;
use common::{AggregateId, CustomerId};
use domain::FlightRequest;
use serde::{Deserialize, Serialize};

use super::ledger::Ledger;
use crate::error::SagaError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightBooking {
    pub confirmation: String,
}

#[async_trait]
pub trait FlightService: Send + Sync {
    async fn book(
        &self,
        booking_id: AggregateId,
        customer_id: CustomerId,
        request: &FlightRequest,
    ) -> Result<FlightBooking, SagaError>;

    /// Cancels a booking made by [`FlightService::book`].
    async fn cancel(&self, confirmation: &str) -> Result<(), SagaError>;
}

/// Flight service that keeps bookings in memory.
#[derive(Clone)]
pub struct InMemoryFlightService {
    ledger: Ledger<(AggregateId, CustomerId, FlightRequest)>,
}

impl Default for InMemoryFlightService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFlightService {
    /// Creates an empty flight service.
    pub fn new() -> Self {
        Self {
            ledger: Ledger::new("FL"),
        }
    }

    /// Makes subsequent bookings fail.
    pub async fn set_fail_on_book(&self, fail: bool) {
        self.ledger.set_fail_on_book(fail).await;
    }

    /// Makes subsequent cancellations fail.
    pub async fn set_fail_on_cancel(&self, fail: bool) {
        self.ledger.set_fail_on_cancel(fail).await;
    }

    /// Makes every call wait `delay` before answering.
    pub async fn set_delay(&self, delay: Duration) {
        self.ledger.set_delay(delay).await;
    }

    /// Number of flights currently booked.
    pub async fn booking_count(&self) -> usize {
        self.ledger.len().await
    }

    /// Returns true if `confirmation` is still booked.
    pub async fn has_booking(&self, confirmation: &str) -> bool {
        self.ledger.get(confirmation).await.is_some()
    }
}

#[async_trait]
impl FlightService for InMemoryFlightService {
    async fn book(
        &self,
        booking_id: AggregateId,
        customer_id: CustomerId,
        request: &FlightRequest,
    ) -> Result<FlightBooking, SagaError> {
        let confirmation = self
            .ledger
            .book(
                (booking_id, customer_id, request.clone()),
                "no seats available",
            )
            .await
            .map_err(SagaError::FlightService)?;

        Ok(FlightBooking { confirmation })
    }

    async fn cancel(&self, confirmation: &str) -> Result<(), SagaError> {
        self.ledger
            .cancel(confirmation)
            .await
            .map_err(SagaError::FlightService)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request() -> FlightRequest {
        FlightRequest {
            origin: "OPO".into(),
            destination: "FCO".into(),
            departure_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            return_date: None,
            passengers: 1,
        }
    }

    #[tokio::test]
    async fn book_and_cancel() {
        let service = InMemoryFlightService::new();
        let booking = service
            .book(AggregateId::new(), CustomerId::new(), &request())
            .await
            .unwrap();

        assert_eq!(booking.confirmation, "FL-0001");
        assert!(service.has_booking(&booking.confirmation).await);

        service.cancel(&booking.confirmation).await.unwrap();
        assert_eq!(service.booking_count().await, 0);

        // A second cancel has nothing left to cancel.
        assert!(service.cancel(&booking.confirmation).await.is_err());
    }

    #[tokio::test]
    async fn failure_switches() {
        let service = InMemoryFlightService::new();
        service.set_fail_on_book(true).await;
        let err = service
            .book(AggregateId::new(), CustomerId::new(), &request())
            .await
            .unwrap_err();
        assert!(matches!(err, SagaError::FlightService(_)));
        assert_eq!(service.booking_count().await, 0);

        service.set_fail_on_book(false).await;
        service.set_fail_on_cancel(true).await;
        let booking = service
            .book(AggregateId::new(), CustomerId::new(), &request())
            .await
            .unwrap();
        assert!(service.cancel(&booking.confirmation).await.is_err());
        assert!(service.has_booking(&booking.confirmation).await);
    }
}
