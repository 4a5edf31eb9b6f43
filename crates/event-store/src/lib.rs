//! Append-only event storage with optimistic concurrency.
//!
//! Two backends share the [`EventStore`] trait: [`InMemoryEventStore`] for tests
//! and single-process runs, and [`PostgresEventStore`] for durable saga state.

pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, Version};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use store::{AppendOptions, EventStore, EventStoreExt};
