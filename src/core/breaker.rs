//! Consecutive-failure circuit breaker for the row entry point.

use log::{error, warn};

/// Failures tolerated before the breaker trips.
pub const FAILURE_THRESHOLD: u32 = 3;

/// Counts row failures and trips once the count exceeds
/// [`FAILURE_THRESHOLD`]. Successful rows do not clear the count; only
/// [`reset`](CircuitBreaker::reset) or a trip does.
#[derive(Debug, Default, Clone)]
pub struct CircuitBreaker {
    failures: u32,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Record a failure. Returns true when the caller must disable itself;
    /// the counter is reset at that point.
    pub fn record_failure(&mut self, cause: &anyhow::Error) -> bool {
        error!("Unexpected failure while decorating row: {:#}", cause);
        self.failures += 1;
        if self.failures > FAILURE_THRESHOLD {
            warn!("Too many decoration failures, disabling row decorations");
            self.failures = 0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }
}
