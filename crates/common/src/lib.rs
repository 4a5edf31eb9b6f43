//! Shared types for the travel booking platform.

mod ids;
mod money;

pub use ids::{AggregateId, CustomerId};
pub use money::Money;
