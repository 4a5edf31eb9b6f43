//! The three steps of a travel booking, in execution order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Aggregate type stored on saga events and logged as `saga_type`.
pub const SAGA_TYPE: &str = "TravelBookingSaga";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BookingStep {
    #[serde(rename = "book_flight")]
    Flight,
    #[serde(rename = "reserve_hotel")]
    Hotel,
    #[serde(rename = "rent_car")]
    Car,
}

impl BookingStep {
    /// Execution order. Compensation walks it backwards.
    pub const ALL: [BookingStep; 3] = [BookingStep::Flight, BookingStep::Hotel, BookingStep::Car];

    /// Step name as stored in events and shown by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStep::Flight => "book_flight",
            BookingStep::Hotel => "reserve_hotel",
            BookingStep::Car => "rent_car",
        }
    }

    /// The step that runs after this one, `None` for the last step.
    pub fn next(&self) -> Option<BookingStep> {
        match self {
            BookingStep::Flight => Some(BookingStep::Hotel),
            BookingStep::Hotel => Some(BookingStep::Car),
            BookingStep::Car => None,
        }
    }
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
