use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventStoreError, Result, Version,
    store::{AppendOptions, EventStore, validate_events_for_append},
};

/// Event store kept entirely in process memory.
///
/// Cloning shares the underlying log.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored events.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    fn current_version(events: &[EventEnvelope], aggregate_id: AggregateId) -> Version {
        events
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .map(|e| e.version)
            .max()
            .unwrap_or_else(Version::initial)
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        validate_events_for_append(&events)?;
        let aggregate_id = events[0].aggregate_id;
        let first_new_version = events[0].version;

        let mut log = self.events.write().await;
        let current = Self::current_version(&log, aggregate_id);

        if let Some(expected) = options.expected_version
            && current != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current,
            });
        }

        // Same rule as the unique (aggregate_id, version) index in Postgres.
        if first_new_version != current.next() {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: options.expected_version.unwrap_or(current),
                actual: current,
            });
        }

        let last_version = events.last().map_or(current, |e| e.version);
        log.extend(events);
        metrics::counter!("events_appended_total").increment(1);

        Ok(last_version)
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let log = self.events.read().await;
        let mut events: Vec<_> = log
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.version);
        Ok(events)
    }

    async fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventEnvelope>> {
        let log = self.events.read().await;
        Ok(log
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect())
    }

    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let log = self.events.read().await;
        Ok(log
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .map(|e| e.version)
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventStoreExt;

    fn create_test_event(
        aggregate_id: AggregateId,
        version: Version,
        event_type: &str,
    ) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type("Account")
            .event_type(event_type)
            .version(version)
            .payload_raw(serde_json::json!({"test": true}))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn append_and_read_back_in_version_order() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();

        let version = store
            .append(
                vec![
                    create_test_event(id, Version::new(1), "AccountOpened"),
                    create_test_event(id, Version::new(2), "FundsDeposited"),
                ],
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();
        assert_eq!(version, Version::new(2));

        let events = store.get_events_for_aggregate(id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "AccountOpened");
        assert_eq!(store.event_count().await, 2);
    }

    #[tokio::test]
    async fn stale_expected_version_conflicts() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();
        store
            .append_event(
                create_test_event(id, Version::first(), "AccountOpened"),
                AppendOptions::expect_new(),
            )
            .await
            .unwrap();

        let result = store
            .append_event(
                create_test_event(id, Version::new(2), "FundsDeposited"),
                AppendOptions::expect_new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn duplicate_version_conflicts_without_expectation() {
        let store = InMemoryEventStore::new();
        let id = AggregateId::new();
        store
            .append_event(
                create_test_event(id, Version::first(), "AccountOpened"),
                AppendOptions::new(),
            )
            .await
            .unwrap();

        let result = store
            .append_event(
                create_test_event(id, Version::first(), "AccountOpened"),
                AppendOptions::new(),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn events_by_type_span_aggregates() {
        let store = InMemoryEventStore::new();
        let a = AggregateId::new();
        let b = AggregateId::new();
        for id in [a, b] {
            store
                .append_event(
                    create_test_event(id, Version::first(), "SagaStarted"),
                    AppendOptions::expect_new(),
                )
                .await
                .unwrap();
        }

        let started = store.get_events_by_type("SagaStarted").await.unwrap();
        assert_eq!(started.len(), 2);
        assert_eq!(started[0].aggregate_id, a);
        assert!(store.aggregate_exists(b).await.unwrap());
        assert!(!store.aggregate_exists(AggregateId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn version_of_unknown_aggregate_is_none() {
        let store = InMemoryEventStore::new();
        assert!(
            store
                .get_aggregate_version(AggregateId::new())
                .await
                .unwrap()
                .is_none()
        );
    }
}
