//! Orchestrates travel booking sagas.

use std::future::Future;
use std::time::Instant;

use common::AggregateId;
use domain::{Aggregate, BookTravelCommand, DomainEvent};
use event_store::{AppendOptions, EventEnvelope, EventStore, EventStoreError, EventStoreExt};

use crate::aggregate::TravelBookingSaga;
use crate::config::SagaConfig;
use crate::error::{Result, SagaError};
use crate::events::SagaEvent;
use crate::services::{CarRentalService, FlightService, HotelService};
use crate::state::SagaState;
use crate::travel_booking::{BookingStep, SAGA_TYPE};

/// Failure recorded for a step that was cut off by a restart.
pub const INTERRUPTED: &str = "interrupted";

/// Drives the flight → hotel → car saga, compensating completed steps in
/// reverse order when one fails. Every transition is appended to the event
/// store before the next call is made, so a saga can be resumed from its
/// history.
pub struct SagaCoordinator<S, F, H, C>
where
    S: EventStore,
    F: FlightService,
    H: HotelService,
    C: CarRentalService,
{
    store: S,
    flights: F,
    hotels: H,
    cars: C,
    config: SagaConfig,
}

impl<S, F, H, C> SagaCoordinator<S, F, H, C>
where
    S: EventStore,
    F: FlightService,
    H: HotelService,
    C: CarRentalService,
{
    /// Creates a coordinator with the default step timeout.
    pub fn new(store: S, flights: F, hotels: H, cars: C) -> Self {
        Self::with_config(store, flights, hotels, cars, SagaConfig::default())
    }

    /// Creates a coordinator with custom timeouts.
    pub fn with_config(store: S, flights: F, hotels: H, cars: C, config: SagaConfig) -> Self {
        Self {
            store,
            flights,
            hotels,
            cars,
            config,
        }
    }

    /// Books flight, hotel and car for `command`.
    ///
    /// Returns the saga id (the command's `booking_id`) whether the booking
    /// completed or was compensated; inspect it with [`Self::get_saga`].
    /// Errors are reserved for rejected requests and infrastructure failures.
    #[tracing::instrument(
        skip(self, command),
        fields(booking_id = %command.booking_id, saga_type = SAGA_TYPE)
    )]
    pub async fn book_travel(&self, command: BookTravelCommand) -> Result<AggregateId> {
        command.validate()?;
        let saga_id = command.booking_id;
        if self.store.aggregate_exists(saga_id).await? {
            return Err(SagaError::AlreadyStarted(saga_id));
        }

        metrics::counter!("saga_executions_total").increment(1);
        let started = Instant::now();

        let mut saga = TravelBookingSaga::default();
        self.record(saga_id, &mut saga, SagaEvent::saga_started(command.clone()))
            .await
            .map_err(|e| match e {
                // Lost a race with an identical submission.
                SagaError::EventStore(EventStoreError::ConcurrencyConflict { .. }) => {
                    SagaError::AlreadyStarted(saga_id)
                }
                other => other,
            })?;

        for step in BookingStep::ALL {
            tracing::info!(%step, "saga step started");
            self.record(saga_id, &mut saga, SagaEvent::step_started(step))
                .await?;

            match self.run_step(step, &command).await {
                Ok(confirmation) => {
                    tracing::info!(%step, %confirmation, "saga step completed");
                    self.record(
                        saga_id,
                        &mut saga,
                        SagaEvent::step_completed(step, confirmation),
                    )
                    .await?;
                }
                Err(e) => {
                    let error = e.to_string();
                    tracing::warn!(%step, %error, "saga step failed");
                    self.record(saga_id, &mut saga, SagaEvent::step_failed(step, error))
                        .await?;

                    self.compensate(saga_id, &mut saga, step).await?;
                    metrics::histogram!("saga_duration_seconds")
                        .record(started.elapsed().as_secs_f64());
                    return Ok(saga_id);
                }
            }
        }

        self.complete(saga_id, &mut saga).await?;
        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);
        tracing::info!(%saga_id, duration, "saga completed");

        Ok(saga_id)
    }

    /// Replays a saga. `None` if no saga has this id.
    pub async fn get_saga(&self, saga_id: AggregateId) -> Result<Option<TravelBookingSaga>> {
        let events = self.store.get_events_for_aggregate(saga_id).await?;
        if events.is_empty() {
            return Ok(None);
        }

        let mut saga = TravelBookingSaga::default();
        for envelope in events {
            let event: SagaEvent = serde_json::from_value(envelope.payload)?;
            saga.apply(event);
            saga.set_version(envelope.version);
        }
        Ok(Some(saga))
    }

    /// Raw event history of a saga, oldest first.
    pub async fn saga_history(&self, saga_id: AggregateId) -> Result<Vec<EventEnvelope>> {
        Ok(self.store.get_events_for_aggregate(saga_id).await?)
    }

    /// Finishes every saga left running or compensating, e.g. by a crash.
    ///
    /// A step that was started but never recorded as done is failed with
    /// [`INTERRUPTED`] and the completed steps are compensated. Sagas whose
    /// three steps all completed are closed as completed. Returns the ids of the
    /// sagas that were touched.
    #[tracing::instrument(skip(self))]
    pub async fn recover_in_flight(&self) -> Result<Vec<AggregateId>> {
        let started = self.store.get_events_by_type("SagaStarted").await?;

        let mut recovered = Vec::new();
        for envelope in started
            .into_iter()
            .filter(|e| e.aggregate_type == TravelBookingSaga::aggregate_type())
        {
            let saga_id = envelope.aggregate_id;
            let Some(mut saga) = self.get_saga(saga_id).await? else {
                continue;
            };
            if !saga.state().is_in_flight() {
                continue;
            }

            tracing::info!(%saga_id, state = %saga.state(), "recovering saga");
            self.resume(saga_id, &mut saga).await?;
            metrics::counter!("saga_recovered_total").increment(1);
            recovered.push(saga_id);
        }

        Ok(recovered)
    }

    async fn resume(&self, saga_id: AggregateId, saga: &mut TravelBookingSaga) -> Result<()> {
        if saga.state() == SagaState::Compensating {
            let from_step = saga
                .failed_step()
                .or(saga.current_step())
                .unwrap_or(BookingStep::Flight);
            return self.compensate(saga_id, saga, from_step).await;
        }

        if let Some(step) = saga.interrupted_step() {
            self.record(saga_id, saga, SagaEvent::step_failed(step, INTERRUPTED))
                .await?;
            return self.compensate(saga_id, saga, step).await;
        }

        if let Some(step) = saga.failed_step() {
            return self.compensate(saga_id, saga, step).await;
        }

        // Stopped between steps.
        let next_step = match saga.completed_steps().last() {
            Some(done) => done.step.next(),
            None => Some(BookingStep::Flight),
        };
        match next_step {
            Some(step) => {
                self.record(saga_id, saga, SagaEvent::step_failed(step, INTERRUPTED))
                    .await?;
                self.compensate(saga_id, saga, step).await
            }
            None => self.complete(saga_id, saga).await,
        }
    }

    async fn run_step(&self, step: BookingStep, command: &BookTravelCommand) -> Result<String> {
        let call = async {
            match step {
                BookingStep::Flight => self
                    .flights
                    .book(command.booking_id, command.customer_id, &command.flight)
                    .await
                    .map(|booking| booking.confirmation),
                BookingStep::Hotel => self
                    .hotels
                    .reserve(command.booking_id, &command.hotel)
                    .await
                    .map(|reservation| reservation.confirmation),
                BookingStep::Car => self
                    .cars
                    .rent(command.booking_id, &command.car)
                    .await
                    .map(|rental| rental.confirmation),
            }
        };
        self.bounded(step, call).await
    }

    async fn undo_step(&self, step: BookingStep, confirmation: &str) -> Result<()> {
        let call = async {
            match step {
                BookingStep::Flight => self.flights.cancel(confirmation).await,
                BookingStep::Hotel => self.hotels.cancel(confirmation).await,
                BookingStep::Car => self.cars.cancel(confirmation).await,
            }
        };
        self.bounded(step, call).await
    }

    async fn bounded<T>(
        &self,
        step: BookingStep,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let timeout = self.config.step_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(SagaError::StepTimedOut {
                    step,
                    timeout_ms: timeout.as_millis(),
                })
            })
    }

    /// Cancels completed steps last-first, then records the saga as failed.
    /// A failing cancellation is recorded and the chain continues.
    #[tracing::instrument(skip(self, saga))]
    async fn compensate(
        &self,
        saga_id: AggregateId,
        saga: &mut TravelBookingSaga,
        from_step: BookingStep,
    ) -> Result<()> {
        if saga.state() != SagaState::Compensating {
            self.record(saga_id, saga, SagaEvent::compensation_started(from_step))
                .await?;
        }

        for completed in saga.pending_compensations() {
            let step = completed.step;
            match self.undo_step(step, &completed.confirmation).await {
                Ok(()) => {
                    tracing::info!(%step, "compensation step completed");
                    self.record(saga_id, saga, SagaEvent::compensation_step_completed(step))
                        .await?;
                }
                Err(e) => {
                    let error = e.to_string();
                    tracing::warn!(%step, %error, "compensation step failed");
                    self.record(
                        saga_id,
                        saga,
                        SagaEvent::compensation_step_failed(step, error),
                    )
                    .await?;
                }
            }
        }

        let reason = match (saga.failed_step(), saga.failure_reason()) {
            (Some(step), Some(error)) => format!("{step} failed: {error}"),
            _ => format!("{from_step} failed"),
        };
        self.record(saga_id, saga, SagaEvent::saga_failed(&reason))
            .await?;

        metrics::counter!("saga_failed").increment(1);
        tracing::warn!(%saga_id, %reason, "saga failed");
        Ok(())
    }

    async fn complete(&self, saga_id: AggregateId, saga: &mut TravelBookingSaga) -> Result<()> {
        self.record(saga_id, saga, SagaEvent::saga_completed())
            .await?;
        metrics::counter!("saga_completed").increment(1);
        Ok(())
    }

    /// Appends `event` at the saga's next version, then applies it.
    async fn record(
        &self,
        saga_id: AggregateId,
        saga: &mut TravelBookingSaga,
        event: SagaEvent,
    ) -> Result<()> {
        let current_version = saga.version();
        let envelope = EventEnvelope::builder()
            .event_type(event.event_type())
            .aggregate_id(saga_id)
            .aggregate_type(TravelBookingSaga::aggregate_type())
            .version(current_version.next())
            .payload(&event)?
            .build()?;

        let new_version = self
            .store
            .append(vec![envelope], AppendOptions::expect_version(current_version))
            .await?;

        saga.apply(event);
        saga.set_version(new_version);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::tests::sample_command;
    use crate::services::{InMemoryCarRentalService, InMemoryFlightService, InMemoryHotelService};
    use event_store::InMemoryEventStore;

    type TestCoordinator = SagaCoordinator<
        InMemoryEventStore,
        InMemoryFlightService,
        InMemoryHotelService,
        InMemoryCarRentalService,
    >;

    fn setup() -> (
        TestCoordinator,
        InMemoryFlightService,
        InMemoryHotelService,
        InMemoryCarRentalService,
    ) {
        let flights = InMemoryFlightService::new();
        let hotels = InMemoryHotelService::new();
        let cars = InMemoryCarRentalService::new();
        let coordinator = SagaCoordinator::new(
            InMemoryEventStore::new(),
            flights.clone(),
            hotels.clone(),
            cars.clone(),
        );
        (coordinator, flights, hotels, cars)
    }

    fn steps(saga: &TravelBookingSaga) -> Vec<BookingStep> {
        saga.completed_steps().iter().map(|c| c.step).collect()
    }

    #[tokio::test]
    async fn test_happy_path() {
        let (coordinator, flights, hotels, cars) = setup();

        let saga_id = coordinator.book_travel(sample_command()).await.unwrap();

        let saga = coordinator.get_saga(saga_id).await.unwrap().unwrap();
        assert_eq!(saga.state(), SagaState::Completed);
        assert_eq!(steps(&saga), BookingStep::ALL);
        assert_eq!(saga.confirmation(BookingStep::Flight), Some("FL-0001"));
        assert_eq!(flights.booking_count().await, 1);
        assert_eq!(hotels.reservation_count().await, 1);
        assert_eq!(cars.rental_count().await, 1);
    }

    #[tokio::test]
    async fn test_flight_failure_needs_no_compensation() {
        let (coordinator, flights, hotels, cars) = setup();
        flights.set_fail_on_book(true).await;

        let saga_id = coordinator.book_travel(sample_command()).await.unwrap();

        let saga = coordinator.get_saga(saga_id).await.unwrap().unwrap();
        assert_eq!(saga.state(), SagaState::Failed);
        assert!(saga.completed_steps().is_empty());
        assert!(saga.compensations().is_empty());
        assert_eq!(
            saga.failure_reason(),
            Some("book_flight failed: Flight service error: no seats available")
        );
        assert_eq!(hotels.reservation_count().await, 0);
        assert_eq!(cars.rental_count().await, 0);
    }

    #[tokio::test]
    async fn test_hotel_failure_cancels_flight() {
        let (coordinator, flights, hotels, cars) = setup();
        hotels.set_fail_on_reserve(true).await;

        let saga_id = coordinator.book_travel(sample_command()).await.unwrap();

        let saga = coordinator.get_saga(saga_id).await.unwrap().unwrap();
        assert_eq!(saga.state(), SagaState::Failed);
        assert_eq!(steps(&saga), [BookingStep::Flight]);
        assert_eq!(saga.failed_step(), Some(BookingStep::Hotel));
        assert_eq!(flights.booking_count().await, 0);
        assert_eq!(cars.rental_count().await, 0);
    }

    #[tokio::test]
    async fn test_car_failure_cancels_hotel_then_flight() {
        let (coordinator, flights, hotels, cars) = setup();
        cars.set_fail_on_rent(true).await;

        let saga_id = coordinator.book_travel(sample_command()).await.unwrap();

        let saga = coordinator.get_saga(saga_id).await.unwrap().unwrap();
        assert_eq!(saga.state(), SagaState::Failed);
        let compensated: Vec<_> = saga.compensations().iter().map(|c| c.step).collect();
        assert_eq!(compensated, [BookingStep::Hotel, BookingStep::Flight]);
        assert_eq!(flights.booking_count().await, 0);
        assert_eq!(hotels.reservation_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_command_records_nothing() {
        let (coordinator, flights, _, _) = setup();
        let mut command = sample_command();
        command.flight.passengers = 0;
        let saga_id = command.booking_id;

        let result = coordinator.book_travel(command).await;

        assert!(matches!(result, Err(SagaError::InvalidRequest(_))));
        assert!(coordinator.get_saga(saga_id).await.unwrap().is_none());
        assert_eq!(flights.booking_count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_booking_id_is_rejected() {
        let (coordinator, flights, _, _) = setup();
        let command = sample_command();

        coordinator.book_travel(command.clone()).await.unwrap();
        let result = coordinator.book_travel(command).await;

        assert!(matches!(result, Err(SagaError::AlreadyStarted(_))));
        assert_eq!(flights.booking_count().await, 1);
    }

    #[tokio::test]
    async fn test_nonexistent_saga() {
        let (coordinator, _, _, _) = setup();
        assert!(
            coordinator
                .get_saga(AggregateId::new())
                .await
                .unwrap()
                .is_none()
        );
    }
}
