//! Hotel reservation service.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::AggregateId;
use domain::HotelStayRequest;
use serde::{Deserialize, Serialize};

use super::ledger::Ledger;
use crate::error::SagaError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelReservation {
    pub confirmation: String,
}

#[async_trait]
pub trait HotelService: Send + Sync {
    async fn reserve(
        &self,
        booking_id: AggregateId,
        request: &HotelStayRequest,
    ) -> Result<HotelReservation, SagaError>;

    async fn cancel(&self, confirmation: &str) -> Result<(), SagaError>;
}

/// Hotel service that keeps reservations in memory.
///
/// When built with [`InMemoryHotelService::with_known_hotels`] it refuses
/// hotel ids outside that set.
#[derive(Clone)]
pub struct InMemoryHotelService {
    ledger: Ledger<(AggregateId, HotelStayRequest)>,
    known_hotels: Option<Arc<HashSet<String>>>,
}

impl Default for InMemoryHotelService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHotelService {
    /// Creates a hotel service that accepts any hotel id.
    pub fn new() -> Self {
        Self {
            ledger: Ledger::new("HT"),
            known_hotels: None,
        }
    }

    /// Creates a hotel service that only accepts `hotel_ids`.
    pub fn with_known_hotels(hotel_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            known_hotels: Some(Arc::new(hotel_ids.into_iter().collect())),
            ..Self::new()
        }
    }

    /// Makes subsequent reservations fail.
    pub async fn set_fail_on_reserve(&self, fail: bool) {
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

    /// Number of rooms currently held.
    pub async fn reservation_count(&self) -> usize {
        self.ledger.len().await
    }

    /// Returns true if `confirmation` is still held.
    pub async fn has_reservation(&self, confirmation: &str) -> bool {
        self.ledger.get(confirmation).await.is_some()
    }
}

#[async_trait]
impl HotelService for InMemoryHotelService {
    async fn reserve(
        &self,
        booking_id: AggregateId,
        request: &HotelStayRequest,
    ) -> Result<HotelReservation, SagaError> {
        if let Some(known) = &self.known_hotels
            && !known.contains(&request.hotel_id)
        {
            return Err(SagaError::HotelService(format!(
                "unknown hotel {}",
                request.hotel_id
            )));
        }

        let confirmation = self
            .ledger
            .book((booking_id, request.clone()), "no rooms available")
            .await
            .map_err(SagaError::HotelService)?;

        Ok(HotelReservation { confirmation })
    }

    async fn cancel(&self, confirmation: &str) -> Result<(), SagaError> {
        self.ledger
            .cancel(confirmation)
            .await
            .map_err(SagaError::HotelService)
    }
}
