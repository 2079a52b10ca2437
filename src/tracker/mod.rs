//! Confirmation tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Submitted record
//!     → poll ledger transaction status on an interval
//!     → confirmed / failed: terminal state recorded
//!     → max wait elapsed: TrackingTimedOut note, state preserved
//!     → caller cancels: polling stops, record untouched
//! ```
//!
//! # Design Decisions
//! - Explicit polling state machine, not nested callbacks
//! - Transient query errors tolerated up to the retry budget
//! - Cancellation never marks a record failed (unknown ≠ failed)

pub mod cancel;

pub use cancel::CancelToken;

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};

use crate::ledger::{LedgerClient, TxStatus};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::tx::{ErrorKind, SharedRecord, SubmissionRecord, SubmissionState};

/// Polls the ledger until a submission reaches a terminal state.
pub struct SubmissionTracker {
    ledger: Arc<dyn LedgerClient>,
    retry: RetryPolicy,
}

impl SubmissionTracker {
    pub fn new(ledger: Arc<dyn LedgerClient>, retry: RetryPolicy) -> Self {
        Self { ledger, retry }
    }

    /// Poll `record` until confirmed, failed, `max_wait` elapses, or
    /// `cancel` fires. Returns a snapshot of the record's final state.
    ///
    /// On timeout the record's state is left unchanged and
    /// `last_error_kind` is set to `TrackingTimedOut`; the caller
    /// decides whether to keep polling. On cancellation the record is
    /// returned untouched.
    pub async fn track_until_terminal(
        &self,
        record: &SharedRecord,
        poll_interval: Duration,
        max_wait: Duration,
        cancel: &CancelToken,
    ) -> SubmissionRecord {
        let snapshot = record.snapshot();
        if snapshot.state.is_terminal() {
            return snapshot;
        }
        let Some(tx_id) = snapshot.ledger_tx_id.clone() else {
            // Nothing submitted yet; there is no status to poll.
            tracing::debug!(trace_id = %snapshot.trace_id, "record has no ledger tx id, nothing to track");
            return snapshot;
        };

        let trace_id = snapshot.trace_id;
        let deadline = Instant::now() + max_wait;
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut transient_failures = 0u32;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(trace_id = %trace_id, "tracking cancelled, outcome unknown");
                    return record.snapshot();
                }
                _ = ticker.tick() => {}
            }

            match self.ledger.transaction_status(&tx_id).await {
                Ok(TxStatus::Confirmed) => {
                    record.update(|r| {
                        r.transition(SubmissionState::Confirmed);
                        r.last_error_kind = None;
                    });
                    metrics::record_submission_state("confirmed");
                    tracing::info!(trace_id = %trace_id, ledger_tx_id = %tx_id, "transaction confirmed");
                    return record.snapshot();
                }
                Ok(TxStatus::Failed { reason }) => {
                    tracing::warn!(
                        trace_id = %trace_id,
                        ledger_tx_id = %tx_id,
                        reason = reason.as_deref().unwrap_or("unspecified"),
                        "transaction failed on ledger"
                    );
                    record.update(|r| r.fail(ErrorKind::NetworkPermanent));
                    metrics::record_submission_state("failed");
                    return record.snapshot();
                }
                Ok(TxStatus::Pending) => {
                    transient_failures = 0;
                    tracing::debug!(trace_id = %trace_id, ledger_tx_id = %tx_id, "transaction pending");
                }
                Err(e) if self.retry.should_retry(&e, transient_failures) => {
                    transient_failures += 1;
                    let delay = self.retry.delay_for(transient_failures);
                    tracing::warn!(
                        trace_id = %trace_id,
                        error = %e,
                        retry = transient_failures,
                        "status query failed, backing off"
                    );
                    metrics::record_retry();
                    sleep(delay).await;
                }
                Err(e) => {
                    let kind = if e.is_transient() {
                        ErrorKind::NetworkTransient
                    } else {
                        ErrorKind::NetworkPermanent
                    };
                    tracing::warn!(trace_id = %trace_id, error = %e, "status query failed terminally");
                    record.update(|r| r.fail(kind));
                    metrics::record_submission_state("failed");
                    return record.snapshot();
                }
            }

            if Instant::now() >= deadline {
                tracing::info!(trace_id = %trace_id, ledger_tx_id = %tx_id, "tracking window elapsed");
                record.update(|r| r.last_error_kind = Some(ErrorKind::TrackingTimedOut));
                return record.snapshot();
            }
        }
    }
}
