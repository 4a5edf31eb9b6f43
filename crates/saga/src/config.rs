use std::time::Duration;

/// Tuning for [`SagaCoordinator`](crate::SagaCoordinator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SagaConfig {
    /// Upper bound for a single step or compensation call.
    pub step_timeout: Duration,
}

impl SagaConfig {
    pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(5);

    /// Config with the given per-step timeout.
    pub fn with_step_timeout(step_timeout: Duration) -> Self {
        Self { step_timeout }
    }
}

impl Default for SagaConfig {
    fn default() -> Self {
        Self::with_step_timeout(Self::DEFAULT_STEP_TIMEOUT)
    }
}
