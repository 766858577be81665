//! Reconnect backoff policy.
//!
//! Linear growth with a hard cap: `min(retry_count × step, cap)`.
//! `retry_count` is 1 for the first failure after a live session and
//! is reset by the supervisor whenever the stream goes live again.

use std::time::Duration;

/// Delay schedule between reconnect attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Increment per consecutive failure.
    step: Duration,
    /// Upper bound on any single delay.
    cap: Duration,
}

impl RetryPolicy {
    pub const STEP: Duration = Duration::from_millis(1_000);
    pub const CAP: Duration = Duration::from_millis(10_000);

    pub const fn new(step: Duration, cap: Duration) -> Self {
        Self { step, cap }
    }

    /// Delay before the attempt following the `retry_count`-th consecutive failure.
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        self.step.saturating_mul(retry_count).min(self.cap)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::STEP, Self::CAP)
    }
}
