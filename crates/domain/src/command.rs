//! Command handling infrastructure.

use std::marker::PhantomData;

use common::AggregateId;
use event_store::{AppendOptions, EventEnvelope, EventStore, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Outcome of a handled command.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// Aggregate state with the new events applied.
    pub aggregate: A,

    /// Events that were persisted.
    pub events: Vec<A::Event>,

    pub new_version: Version,
}

/// An intention addressed to a single aggregate instance.
pub trait Command: Send + Sync {
    type Aggregate: Aggregate;

    fn aggregate_id(&self) -> AggregateId;
}

/// Loads an aggregate, runs a decision function against it and persists the
/// resulting events with optimistic concurrency.
pub struct CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replays an aggregate. Unknown ids yield `A::default()`.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        let events = self.store.get_events_for_aggregate(aggregate_id).await?;

        let mut aggregate = A::default();
        for envelope in events {
            let event: A::Event = serde_json::from_value(envelope.payload)?;
            aggregate.apply(event);
            aggregate.set_version(envelope.version);
        }

        Ok(aggregate)
    }

    /// Replays an aggregate, returning `None` if it was never created.
    pub async fn load_existing(&self, aggregate_id: AggregateId) -> Result<Option<A>, DomainError> {
        let aggregate = self.load(aggregate_id).await?;
        Ok(aggregate.id().is_some().then_some(aggregate))
    }

    /// Executes `decide` against the current state and appends what it returns.
    ///
    /// An empty event list is a successful no-op.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        decide: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let mut aggregate = self.load(aggregate_id).await?;
        let current_version = aggregate.version();

        let events = decide(&aggregate)?;
        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events,
                new_version: current_version,
            });
        }

        let envelopes = Self::build_envelopes(aggregate_id, current_version, &events)?;
        let new_version = self
            .store
            .append(envelopes, AppendOptions::expect_version(current_version))
            .await?;

        aggregate.apply_events(events.iter().cloned());
        aggregate.set_version(new_version);

        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }

    fn build_envelopes(
        aggregate_id: AggregateId,
        current_version: Version,
        events: &[A::Event],
    ) -> Result<Vec<EventEnvelope>, DomainError> {
        let mut version = current_version;
        events
            .iter()
            .map(|event| -> Result<EventEnvelope, DomainError> {
                version = version.next();
                Ok(EventEnvelope::builder()
                    .aggregate_id(aggregate_id)
                    .aggregate_type(A::aggregate_type())
                    .event_type(event.event_type())
                    .version(version)
                    .payload(event)?
                    .build()?)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountError, AccountEvent};
    use common::{CustomerId, Money};
    use event_store::InMemoryEventStore;

    fn handler(store: InMemoryEventStore) -> CommandHandler<InMemoryEventStore, Account> {
        CommandHandler::new(store)
    }

    #[tokio::test]
    async fn execute_persists_and_applies_events() {
        let store = InMemoryEventStore::new();
        let handler = handler(store.clone());
        let id = AggregateId::new();
        let customer = CustomerId::new();

        let result = handler
            .execute(id, |account| account.open(id, customer))
            .await
            .unwrap();

        assert_eq!(result.new_version, Version::first());
        assert_eq!(result.aggregate.id(), Some(id));
        assert_eq!(store.event_count().await, 1);

        let result = handler
            .execute(id, |account| account.deposit(Money::from_cents(500)))
            .await
            .unwrap();
        assert_eq!(result.new_version, Version::new(2));
        assert_eq!(result.aggregate.balance(), Money::from_cents(500));
    }

    #[tokio::test]
    async fn rejected_command_persists_nothing() {
        let store = InMemoryEventStore::new();
        let handler = handler(store.clone());

        let result = handler
            .execute(AggregateId::new(), |account| {
                account.deposit(Money::from_cents(100))
            })
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Account(AccountError::NotOpen))
        ));
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn empty_decision_is_a_no_op() {
        let store = InMemoryEventStore::new();
        let handler = handler(store.clone());

        let result = handler
            .execute(AggregateId::new(), |_| Ok(Vec::<AccountEvent>::new()))
            .await
            .unwrap();

        assert!(result.events.is_empty());
        assert_eq!(result.new_version, Version::initial());
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn load_existing_distinguishes_unknown_ids() {
        let handler = handler(InMemoryEventStore::new());
        let id = AggregateId::new();

        assert!(handler.load_existing(id).await.unwrap().is_none());

        handler
            .execute(id, |account| account.open(id, CustomerId::new()))
            .await
            .unwrap();
        let loaded = handler.load_existing(id).await.unwrap().unwrap();
        assert_eq!(loaded.version(), Version::first());
    }
}
