//! Travel booking request: one flight, one hotel stay and one car rental
//! booked together.

use chrono::NaiveDate;
use common::{AggregateId, CustomerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TravelError {
    #[error("Invalid travel request: {0}")]
    InvalidRequest(String),
}

fn invalid(reason: impl Into<String>) -> TravelError {
    TravelError::InvalidRequest(reason.into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    pub passengers: u32,
}

impl FlightRequest {
    fn validate(&self) -> Result<(), TravelError> {
        let origin = self.origin.trim();
        let destination = self.destination.trim();
        if origin.is_empty() || destination.is_empty() {
            return Err(invalid("flight origin and destination are required"));
        }
        if origin.eq_ignore_ascii_case(destination) {
            return Err(invalid("flight origin and destination must differ"));
        }
        if self.passengers == 0 {
            return Err(invalid("at least one passenger is required"));
        }
        if let Some(return_date) = self.return_date
            && return_date < self.departure_date
        {
            return Err(invalid("return date is before departure date"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelStayRequest {
    pub hotel_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub rooms: u32,
    pub guests: u32,
}

impl HotelStayRequest {
    /// Number of nights between check-in and check-out.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    fn validate(&self) -> Result<(), TravelError> {
        if self.hotel_id.trim().is_empty() {
            return Err(invalid("hotel id is required"));
        }
        if self.check_out <= self.check_in {
            return Err(invalid("check-out must be after check-in"));
        }
        if self.rooms == 0 {
            return Err(invalid("at least one room is required"));
        }
        if self.guests == 0 {
            return Err(invalid("at least one guest is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarRentalRequest {
    pub pickup_location: String,
    pub pickup_date: NaiveDate,
    pub dropoff_date: NaiveDate,
    pub car_class: String,
}

impl CarRentalRequest {
    fn validate(&self) -> Result<(), TravelError> {
        if self.pickup_location.trim().is_empty() {
            return Err(invalid("car pickup location is required"));
        }
        if self.dropoff_date < self.pickup_date {
            return Err(invalid("car drop-off is before pickup"));
        }
        Ok(())
    }
}

/// Books a flight, a hotel stay and a car as one compensating transaction.
///
/// `booking_id` is also the id of the saga that carries the booking out, so
/// submitting the same command twice is detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookTravelCommand {
    #[serde(default)]
    pub booking_id: AggregateId,
    pub customer_id: CustomerId,
    pub flight: FlightRequest,
    pub hotel: HotelStayRequest,
    pub car: CarRentalRequest,
}

impl BookTravelCommand {
    pub fn new(
        customer_id: CustomerId,
        flight: FlightRequest,
        hotel: HotelStayRequest,
        car: CarRentalRequest,
    ) -> Self {
        Self {
            booking_id: AggregateId::new(),
            customer_id,
            flight,
            hotel,
            car,
        }
    }

    pub fn validate(&self) -> Result<(), TravelError> {
        self.flight.validate()?;
        self.hotel.validate()?;
        self.car.validate()
    }
}
