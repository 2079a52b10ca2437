//! Retry policy for ledger submissions.
//!
//! # Responsibilities
//! - Bound the number of retries for transient failures
//! - Never retry failures classified as permanent
//! - Provide backoff delays between attempts
//!
//! Thresholds here are configurable defaults, not protocol constants.

use std::time::Duration;

use crate::ledger::LedgerError;
use crate::resilience::backoff::calculate_backoff;

/// Bounded retry policy with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum retries after the initial attempt.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 250,
            backoff_max_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// Whether another retry is allowed for this error after
    /// `retries_used` retries have already been spent.
    pub fn should_retry(&self, error: &LedgerError, retries_used: u32) -> bool {
        error.is_transient() && retries_used < self.max_retries
    }

    /// Delay before the given retry (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        calculate_backoff(retry, self.backoff_base_ms, self.backoff_max_ms)
    }
}
