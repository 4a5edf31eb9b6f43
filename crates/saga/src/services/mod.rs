//! Booking services called by the saga, each with an in-memory implementation.

pub mod car;
pub mod flight;
pub mod hotel;
mod ledger;

pub use car::{CarRental, CarRentalService, InMemoryCarRentalService};
pub use flight::{FlightBooking, FlightService, InMemoryFlightService};
pub use hotel::{HotelReservation, HotelService, InMemoryHotelService};
