//! Exponential backoff and attempt classification.

use crate::error::{FetchError, FetchResult};
use std::time::Duration;

/// Default delay after the first failed attempt.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(1000);

/// Default upper bound on any single delay.
pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_millis(10_000);

/// Capped exponential backoff without jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    base: Duration,
    cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_CAP)
    }
}

impl RetryPolicy {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn cap(&self) -> Duration {
        self.cap
    }

    /// Delay to wait after attempt `attempt` (0-indexed) failed:
    /// `min(base * 2^attempt, cap)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        1u32.checked_shl(attempt)
            .and_then(|factor| self.base.checked_mul(factor))
            .map_or(self.cap, |delay| delay.min(self.cap))
    }
}

/// Result of a single attempt, as seen by the retry loop.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Success(T),
    RetryableFailure(FetchError),
    TerminalFailure(FetchError),
}

impl<T> From<FetchResult<T>> for AttemptOutcome<T> {
    fn from(result: FetchResult<T>) -> Self {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(e) if e.is_retryable() => AttemptOutcome::RetryableFailure(e),
            Err(e) => AttemptOutcome::TerminalFailure(e),
        }
    }
}
