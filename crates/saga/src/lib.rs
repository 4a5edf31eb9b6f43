//! Travel booking saga.
//!
//! A booking reserves three things in order:
//! 1. Book the flight
//! 2. Reserve the hotel
//! 3. Rent the car
//!
//! If a step fails, the steps that went through are cancelled in reverse
//! order. The saga is itself event-sourced, so a booking interrupted by a
//! restart is finished by [`SagaCoordinator::recover_in_flight`].

pub mod aggregate;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod services;
pub mod state;
pub mod travel_booking;

pub use aggregate::{CompensationOutcome, CompletedStep, TravelBookingSaga};
pub use config::SagaConfig;
pub use coordinator::{INTERRUPTED, SagaCoordinator};
pub use error::{Result, SagaError};
pub use events::SagaEvent;
pub use services::{
    CarRental, CarRentalService, FlightBooking, FlightService, HotelReservation, HotelService,
    InMemoryCarRentalService, InMemoryFlightService, InMemoryHotelService,
};
pub use state::SagaState;
pub use travel_booking::{BookingStep, SAGA_TYPE};
