//! Car rental service.

use std::time::Duration;

use async_trait::async_trait;
use common::AggregateId;
use domain::CarRentalRequest;
use serde::{Deserialize, Serialize};

use super::ledger::Ledger;
use crate::error::SagaError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarRental {
    pub confirmation: String,
}

#[async_trait]
pub trait CarRentalService: Send + Sync {
    async fn rent(
        &self,
        booking_id: AggregateId,
        request: &CarRentalRequest,
    ) -> Result<CarRental, SagaError>;

    async fn cancel(&self, confirmation: &str) -> Result<(), SagaError>;
}

#[derive(Clone)]
pub struct InMemoryCarRentalService {
    ledger: Ledger<(AggregateId, CarRentalRequest)>,
}

impl Default for InMemoryCarRentalService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCarRentalService {
    /// Creates an empty car rental service.
    pub fn new() -> Self {
        Self {
            ledger: Ledger::new("CR"),
        }
    }

    /// Makes subsequent rentals fail.
    pub async fn set_fail_on_rent(&self, fail: bool) {
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

    /// Number of cars currently rented.
    pub async fn rental_count(&self) -> usize {
        self.ledger.len().await
    }

    /// Returns true if `confirmation` is still rented.
    pub async fn has_rental(&self, confirmation: &str) -> bool {
        self.ledger.get(confirmation).await.is_some()
    }
}

#[async_trait]
impl CarRentalService for InMemoryCarRentalService {
    async fn rent(
        &self,
        booking_id: AggregateId,
        request: &CarRentalRequest,
    ) -> Result<CarRental, SagaError> {
        let declined = format!("no {} cars available", request.car_class);
        let confirmation = self
            .ledger
            .book((booking_id, request.clone()), &declined)
            .await
            .map_err(SagaError::CarRentalService)?;

        Ok(CarRental { confirmation })
    }

    async fn cancel(&self, confirmation: &str) -> Result<(), SagaError> {
        self.ledger
            .cancel(confirmation)
            .await
            .map_err(SagaError::CarRentalService)
    }
}
