//! Travel booking saga aggregate.

use chrono::{DateTime, Utc};
use common::{AggregateId, CustomerId};
use domain::{Aggregate, BookTravelCommand};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::error::SagaError;
use crate::events::SagaEvent;
use crate::state::SagaState;
use crate::travel_booking::{BookingStep, SAGA_TYPE};

/// A step that went through, with the confirmation needed to undo it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedStep {
    pub step: BookingStep,
    pub confirmation: String,
}

/// Outcome of one compensation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationOutcome {
    pub step: BookingStep,
    /// `None` when the step was cancelled.
    pub error: Option<String>,
}

/// Event-sourced record of one travel booking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TravelBookingSaga {
    id: Option<AggregateId>,
    version: Version,
    customer_id: Option<CustomerId>,
    command: Option<BookTravelCommand>,
    state: SagaState,
    /// Last step that was started.
    current_step: Option<BookingStep>,
    completed_steps: Vec<CompletedStep>,
    failed_step: Option<BookingStep>,
    failure_reason: Option<String>,
    compensations: Vec<CompensationOutcome>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Aggregate for TravelBookingSaga {
    type Event = SagaEvent;
    type Error = SagaError;

    fn aggregate_type() -> &'static str {
        SAGA_TYPE
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            SagaEvent::SagaStarted(data) => {
                self.id = Some(data.saga_id);
                self.customer_id = Some(data.customer_id);
                self.command = Some(data.command);
                self.started_at = Some(data.started_at);
                self.state = SagaState::Running;
            }
            SagaEvent::StepStarted(data) => {
                self.current_step = Some(data.step);
            }
            SagaEvent::StepCompleted(data) => {
                self.completed_steps.push(CompletedStep {
                    step: data.step,
                    confirmation: data.confirmation,
                });
            }
            SagaEvent::StepFailed(data) => {
                self.failed_step = Some(data.step);
                self.failure_reason = Some(data.error);
            }
            SagaEvent::CompensationStarted(_) => {
                self.state = SagaState::Compensating;
            }
            SagaEvent::CompensationStepCompleted(data) => {
                self.compensations.push(CompensationOutcome {
                    step: data.step,
                    error: None,
                });
            }
            SagaEvent::CompensationStepFailed(data) => {
                self.compensations.push(CompensationOutcome {
                    step: data.step,
                    error: Some(data.error),
                });
            }
            SagaEvent::SagaCompleted(data) => {
                self.state = SagaState::Completed;
                self.finished_at = Some(data.completed_at);
            }
            SagaEvent::SagaFailed(data) => {
                self.state = SagaState::Failed;
                self.failure_reason = Some(data.reason);
                self.finished_at = Some(data.failed_at);
            }
        }
    }
}

impl TravelBookingSaga {
    /// Current lifecycle state.
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Customer the trip is booked for.
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    /// The booking request this saga is carrying out.
    pub fn command(&self) -> Option<&BookTravelCommand> {
        self.command.as_ref()
    }

    /// The most recently started step.
    pub fn current_step(&self) -> Option<BookingStep> {
        self.current_step
    }

    /// Steps that succeeded, in execution order.
    pub fn completed_steps(&self) -> &[CompletedStep] {
        &self.completed_steps
    }

    /// Returns true if `step` succeeded.
    pub fn is_step_completed(&self, step: BookingStep) -> bool {
        self.completed_steps.iter().any(|c| c.step == step)
    }

    /// Confirmation number returned by `step`, if it succeeded.
    pub fn confirmation(&self, step: BookingStep) -> Option<&str> {
        self.completed_steps
            .iter()
            .find(|c| c.step == step)
            .map(|c| c.confirmation.as_str())
    }

    /// The step whose failure triggered compensation.
    pub fn failed_step(&self) -> Option<BookingStep> {
        self.failed_step
    }

    /// Why the saga failed, e.g. `reserve_hotel failed: ...`.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Compensation attempts recorded so far.
    pub fn compensations(&self) -> &[CompensationOutcome] {
        &self.compensations
    }

    /// Completed steps that still need a compensation attempt, last first.
    pub fn pending_compensations(&self) -> Vec<CompletedStep> {
        self.completed_steps
            .iter()
            .rev()
            .filter(|c| !self.compensations.iter().any(|o| o.step == c.step))
            .cloned()
            .collect()
    }

    /// A step that was started but has neither completed nor failed.
    pub fn interrupted_step(&self) -> Option<BookingStep> {
        self.current_step
            .filter(|step| !self.is_step_completed(*step) && self.failed_step != Some(*step))
    }

    /// When the saga started.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// When the saga completed or failed.
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }
}
