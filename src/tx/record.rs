//! Submission lifecycle record and its state machine.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::tx::request::IdempotencyKey;

/// Lifecycle state of a tracked submission.
///
/// Legal transitions:
/// ```text
/// pending -> signed -> submitted -> confirmed
///    |          |          |
///    +----------+----------+--> failed
/// ```
/// `submitted -> submitted` is legal on a network retry. `confirmed`
/// and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionState {
    Pending,
    Signed,
    Submitted,
    Confirmed,
    Failed,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Confirmed | SubmissionState::Failed)
    }

    pub fn can_transition_to(self, next: SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, next),
            (Pending, Signed)
                | (Signed, Submitted)
                | (Submitted, Submitted)
                | (Submitted, Confirmed)
                | (Pending, Failed)
                | (Signed, Failed)
                | (Submitted, Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Pending => "pending",
            SubmissionState::Signed => "signed",
            SubmissionState::Submitted => "submitted",
            SubmissionState::Confirmed => "confirmed",
            SubmissionState::Failed => "failed",
        }
    }
}

/// Classified failure kinds recorded on a submission and surfaced to
/// the UI, which renders "needs user action", "retrying", and
/// "terminal failure" differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ExtensionNotFound,
    AccessDenied,
    KeyUnavailable,
    SignatureRejected,
    SignatureTimeout,
    WalletNotConnected,
    Validation,
    NetworkTransient,
    NetworkPermanent,
    TrackingTimedOut,
    NotFound,
}

impl ErrorKind {
    /// Whether resolving this failure requires user action rather than
    /// an automatic retry.
    pub fn needs_user_action(&self) -> bool {
        matches!(
            self,
            ErrorKind::ExtensionNotFound
                | ErrorKind::AccessDenied
                | ErrorKind::KeyUnavailable
                | ErrorKind::SignatureRejected
                | ErrorKind::SignatureTimeout
                | ErrorKind::WalletNotConnected
                | ErrorKind::Validation
        )
    }
}

impl std::fmt::Display for ErrorKind {
    // Mirrors the serde snake_case rename.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::ExtensionNotFound => "extension_not_found",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::KeyUnavailable => "key_unavailable",
            ErrorKind::SignatureRejected => "signature_rejected",
            ErrorKind::SignatureTimeout => "signature_timeout",
            ErrorKind::WalletNotConnected => "wallet_not_connected",
            ErrorKind::Validation => "validation",
            ErrorKind::NetworkTransient => "network_transient",
            ErrorKind::NetworkPermanent => "network_permanent",
            ErrorKind::TrackingTimedOut => "tracking_timed_out",
            ErrorKind::NotFound => "not_found",
        };
        f.write_str(name)
    }
}

/// Mutable tracking state for one submission, keyed by idempotency
/// fingerprint. At most one non-terminal record exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub idempotency_key: IdempotencyKey,
    /// Correlation id for log lines spanning the submission lifecycle.
    pub trace_id: Uuid,
    pub state: SubmissionState,
    pub ledger_tx_id: Option<String>,
    /// Number of ledger submission attempts made so far.
    pub attempts: u32,
    pub last_error_kind: Option<ErrorKind>,
}

impl SubmissionRecord {
    pub fn new(idempotency_key: IdempotencyKey) -> Self {
        Self {
            idempotency_key,
            trace_id: Uuid::new_v4(),
            state: SubmissionState::Pending,
            ledger_tx_id: None,
            attempts: 0,
            last_error_kind: None,
        }
    }

    /// Apply a state transition, ignoring illegal ones.
    pub fn transition(&mut self, next: SubmissionState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!(
                trace_id = %self.trace_id,
                from = self.state.as_str(),
                to = next.as_str(),
                "ignoring illegal submission state transition"
            );
            return;
        }
        self.state = next;
    }

    /// Mark the record permanently failed with the classified kind.
    /// A record that already reached `confirmed` is left untouched.
    pub fn fail(&mut self, kind: ErrorKind) {
        self.transition(SubmissionState::Failed);
        if self.state == SubmissionState::Failed {
            self.last_error_kind = Some(kind);
        }
    }
}

/// Shared handle to a [`SubmissionRecord`], returned by the submitter
/// and read concurrently by the tracker and the UI.
///
/// The inner mutex guards short, non-awaiting critical sections only.
#[derive(Debug, Clone)]
pub struct SharedRecord {
    inner: Arc<Mutex<SubmissionRecord>>,
}

impl SharedRecord {
    pub fn new(record: SubmissionRecord) -> Self {
        Self {
            inner: Arc::new(Mutex::new(record)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SubmissionRecord> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current record.
    pub fn snapshot(&self) -> SubmissionRecord {
        self.lock().clone()
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().state
    }

    /// Mutate the record under the lock.
    pub fn update<F: FnOnce(&mut SubmissionRecord)>(&self, f: F) {
        f(&mut self.lock());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::request::{EventType, IdempotencyKey, Payload};

    fn key() -> IdempotencyKey {
        IdempotencyKey::derive(
            &Payload::LogEvent {
                product_id: "PRD-1".into(),
                event_type: EventType::Ship,
                location: "here".into(),
                notes: None,
            },
            "GABC",
        )
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut record = SubmissionRecord::new(key());
        assert_eq!(record.state, SubmissionState::Pending);
        record.transition(SubmissionState::Signed);
        record.transition(SubmissionState::Submitted);
        // Retry keeps the record in submitted.
        record.transition(SubmissionState::Submitted);
        record.transition(SubmissionState::Confirmed);
        assert_eq!(record.state, SubmissionState::Confirmed);
        assert!(record.state.is_terminal());
    }

    #[test]
    fn test_illegal_transitions_are_ignored() {
        let mut record = SubmissionRecord::new(key());
        // Cannot skip straight to submitted.
        record.transition(SubmissionState::Submitted);
        assert_eq!(record.state, SubmissionState::Pending);

        record.fail(ErrorKind::SignatureRejected);
        assert_eq!(record.state, SubmissionState::Failed);
        // Terminal states never leave.
        record.transition(SubmissionState::Signed);
        assert_eq!(record.state, SubmissionState::Failed);
    }

    #[test]
    fn test_fail_records_error_kind() {
        let mut record = SubmissionRecord::new(key());
        record.fail(ErrorKind::NetworkTransient);
        assert_eq!(record.last_error_kind, Some(ErrorKind::NetworkTransient));
        assert!(record.last_error_kind.unwrap().to_string().contains("transient"));
    }

    #[test]
    fn test_shared_record_updates_visible_across_clones() {
        let shared = SharedRecord::new(SubmissionRecord::new(key()));
        let other = shared.clone();
        shared.update(|r| {
            r.transition(SubmissionState::Signed);
            r.attempts += 1;
        });
        assert_eq!(other.state(), SubmissionState::Signed);
        assert_eq!(other.snapshot().attempts, 1);
    }

    #[test]
    fn test_needs_user_action_split() {
        assert!(ErrorKind::SignatureRejected.needs_user_action());
        assert!(ErrorKind::WalletNotConnected.needs_user_action());
        assert!(!ErrorKind::NetworkTransient.needs_user_action());
        assert!(!ErrorKind::NetworkPermanent.needs_user_action());
    }
}
