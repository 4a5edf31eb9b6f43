//! Lifecycle of a travel booking saga.

use serde::{Deserialize, Serialize};

/// Transitions:
/// ```text
/// NotStarted ──► Running ──┬──► Completed
///                          └──► Compensating ──► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    #[default]
    NotStarted,

    /// Booking steps are executing.
    Running,

    /// A step failed; completed steps are being cancelled in reverse order.
    Compensating,

    /// Flight, hotel and car are all booked.
    Completed,

    /// Compensation has finished after a failure.
    Failed,
}

impl SagaState {
    /// Returns true for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::Completed | SagaState::Failed)
    }

    /// A started saga that has not reached a terminal state. These are the
    /// sagas picked up by recovery after a restart.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SagaState::Running | SagaState::Compensating)
    }

    /// Name used in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::NotStarted => "NotStarted",
            SagaState::Running => "Running",
            SagaState::Compensating => "Compensating",
            SagaState::Completed => "Completed",
            SagaState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
