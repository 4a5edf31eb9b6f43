//! Events recorded by a travel booking saga.

use chrono::{DateTime, Utc};
use common::{AggregateId, CustomerId};
use domain::{BookTravelCommand, DomainEvent};
use serde::{Deserialize, Serialize};

use crate::travel_booking::{BookingStep, SAGA_TYPE};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SagaEvent {
    SagaStarted(SagaStartedData),
    StepStarted(StepData),
    StepCompleted(StepCompletedData),
    StepFailed(StepFailedData),
    CompensationStarted(CompensationData),
    CompensationStepCompleted(StepData),
    /// A compensation call failed. Recorded, and the chain continues.
    CompensationStepFailed(StepFailedData),
    SagaCompleted(SagaCompletedData),
    SagaFailed(SagaFailedData),
}

impl DomainEvent for SagaEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SagaEvent::SagaStarted(_) => "SagaStarted",
            SagaEvent::StepStarted(_) => "StepStarted",
            SagaEvent::StepCompleted(_) => "StepCompleted",
            SagaEvent::StepFailed(_) => "StepFailed",
            SagaEvent::CompensationStarted(_) => "CompensationStarted",
            SagaEvent::CompensationStepCompleted(_) => "CompensationStepCompleted",
            SagaEvent::CompensationStepFailed(_) => "CompensationStepFailed",
            SagaEvent::SagaCompleted(_) => "SagaCompleted",
            SagaEvent::SagaFailed(_) => "SagaFailed",
        }
    }
}

/// Carries the full booking request so an interrupted saga can be
/// compensated after a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaStartedData {
    pub saga_id: AggregateId,
    pub customer_id: CustomerId,
    pub saga_type: String,
    pub command: BookTravelCommand,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepData {
    pub step: BookingStep,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepCompletedData {
    pub step: BookingStep,
    /// Confirmation issued by the booking service; needed to cancel the step.
    pub confirmation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFailedData {
    pub step: BookingStep,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationData {
    /// The step whose failure triggered compensation.
    pub from_step: BookingStep,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaCompletedData {
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaFailedData {
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}

impl SagaEvent {
    /// Creates a SagaStarted event carrying the full booking request.
    pub fn saga_started(command: BookTravelCommand) -> Self {
        SagaEvent::SagaStarted(SagaStartedData {
            saga_id: command.booking_id,
            customer_id: command.customer_id,
            saga_type: SAGA_TYPE.to_string(),
            command,
            started_at: Utc::now(),
        })
    }

    /// Creates a StepStarted event.
    pub fn step_started(step: BookingStep) -> Self {
        SagaEvent::StepStarted(StepData { step })
    }

    /// Creates a StepCompleted event with the service confirmation.
    pub fn step_completed(step: BookingStep, confirmation: impl Into<String>) -> Self {
        SagaEvent::StepCompleted(StepCompletedData {
            step,
            confirmation: confirmation.into(),
        })
    }

    /// Creates a StepFailed event.
    pub fn step_failed(step: BookingStep, error: impl Into<String>) -> Self {
        SagaEvent::StepFailed(StepFailedData {
            step,
            error: error.into(),
        })
    }

    /// Creates a CompensationStarted event.
    pub fn compensation_started(from_step: BookingStep) -> Self {
        SagaEvent::CompensationStarted(CompensationData { from_step })
    }

    /// Creates a CompensationStepCompleted event.
    pub fn compensation_step_completed(step: BookingStep) -> Self {
        SagaEvent::CompensationStepCompleted(StepData { step })
    }

    /// Creates a CompensationStepFailed event.
    pub fn compensation_step_failed(step: BookingStep, error: impl Into<String>) -> Self {
        SagaEvent::CompensationStepFailed(StepFailedData {
            step,
            error: error.into(),
        })
    }

    /// Creates a SagaCompleted event stamped now.
    pub fn saga_completed() -> Self {
        SagaEvent::SagaCompleted(SagaCompletedData {
            completed_at: Utc::now(),
        })
    }

    /// Creates a SagaFailed event stamped now.
    pub fn saga_failed(reason: impl Into<String>) -> Self {
        SagaEvent::SagaFailed(SagaFailedData {
            reason: reason.into(),
            failed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::{CarRentalRequest, FlightRequest, HotelStayRequest};

    pub(crate) fn sample_command() -> BookTravelCommand {
        let day = |d| NaiveDate::from_ymd_opt(2025, 7, d).unwrap();
        BookTravelCommand::new(
            CustomerId::new(),
            FlightRequest {
                origin: "MAD".into(),
                destination: "LIS".into(),
                departure_date: day(10),
                return_date: Some(day(14)),
                passengers: 1,
            },
            HotelStayRequest {
                hotel_id: "HTL-LIS-001".into(),
                check_in: day(10),
                check_out: day(14),
                rooms: 1,
                guests: 1,
            },
            CarRentalRequest {
                pickup_location: "LIS Airport".into(),
                pickup_date: day(10),
                dropoff_date: day(14),
                car_class: "economy".into(),
            },
        )
    }

    #[test]
    fn event_types_match_variant_names() {
        let cases = [
            (SagaEvent::saga_started(sample_command()), "SagaStarted"),
            (SagaEvent::step_started(BookingStep::Flight), "StepStarted"),
            (
                SagaEvent::step_completed(BookingStep::Flight, "FL-0001"),
                "StepCompleted",
            ),
            (
                SagaEvent::step_failed(BookingStep::Hotel, "sold out"),
                "StepFailed",
            ),
            (
                SagaEvent::compensation_started(BookingStep::Hotel),
                "CompensationStarted",
            ),
            (
                SagaEvent::compensation_step_completed(BookingStep::Flight),
                "CompensationStepCompleted",
            ),
            (
                SagaEvent::compensation_step_failed(BookingStep::Flight, "timeout"),
                "CompensationStepFailed",
            ),
            (SagaEvent::saga_completed(), "SagaCompleted"),
            (SagaEvent::saga_failed("reserve_hotel failed"), "SagaFailed"),
        ];

        for (event, expected) in cases {
            assert_eq!(event.event_type(), expected);
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], expected);
        }
    }

    #[test]
    fn saga_started_keeps_the_whole_command() {
        let command = sample_command();
        let event = SagaEvent::saga_started(command.clone());

        let json = serde_json::to_string(&event).unwrap();
        let SagaEvent::SagaStarted(data) = serde_json::from_str(&json).unwrap() else {
            panic!("expected SagaStarted");
        };

        assert_eq!(data.saga_id, command.booking_id);
        assert_eq!(data.customer_id, command.customer_id);
        assert_eq!(data.saga_type, SAGA_TYPE);
        assert_eq!(data.command, command);
    }

    #[test]
    fn step_payload_uses_step_names() {
        let json = serde_json::to_value(SagaEvent::step_completed(BookingStep::Car, "CR-0003"))
            .unwrap();
        assert_eq!(json["data"]["step"], "rent_car");
        assert_eq!(json["data"]["confirmation"], "CR-0003");
    }
}
