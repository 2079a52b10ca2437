//! Transaction submission with idempotent de-duplication.
//!
//! # Responsibilities
//! - Gate submissions on a connected wallet session
//! - Enforce at most one in-flight submission per idempotency key
//! - Drive pending → signed → submitted, recording every failure
//! - Retry transient network failures with bounded backoff

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::sleep;

use crate::ledger::{LedgerClient, Network};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::tx::record::{ErrorKind, SharedRecord, SubmissionRecord, SubmissionState};
use crate::tx::request::{IdempotencyKey, TransactionRequest, UnsignedEnvelope};
use crate::wallet::{WalletError, WalletSession};

/// Errors surfaced directly by `submit` (failures after a record is
/// created are reported on the record instead).
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Submission requires a connected wallet session.
    #[error("wallet not connected")]
    WalletNotConnected,
}

/// Builds envelopes, requests signatures, and hands signed envelopes to
/// the ledger network, tracking each submission by idempotency key.
pub struct TransactionSubmitter {
    session: Arc<WalletSession>,
    ledger: Arc<dyn LedgerClient>,
    network: Network,
    retry: RetryPolicy,
    in_flight: DashMap<IdempotencyKey, SharedRecord>,
}

impl TransactionSubmitter {
    pub fn new(
        session: Arc<WalletSession>,
        ledger: Arc<dyn LedgerClient>,
        network: Network,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            session,
            ledger,
            network,
            retry,
            in_flight: DashMap::new(),
        }
    }

    /// Submit a request: sign, then hand to the ledger.
    ///
    /// If a record with the same idempotency key is still in flight,
    /// that record is returned unchanged: no duplicate signature
    /// prompt, no duplicate ledger write. Signature and network
    /// failures are recorded on the returned record, not returned as
    /// `Err`; only a missing wallet connection fails the call itself.
    pub async fn submit(&self, request: TransactionRequest) -> Result<SharedRecord, SubmitError> {
        if !self.session.is_connected() {
            return Err(SubmitError::WalletNotConnected);
        }

        // Atomically claim or reuse the slot for this key. No awaiting
        // happens while the map entry is held.
        let (record, claimed) = match self.in_flight.entry(request.idempotency_key.clone()) {
            Entry::Occupied(mut slot) => {
                let existing = slot.get().clone();
                if existing.state().is_terminal() {
                    let fresh = SharedRecord::new(SubmissionRecord::new(
                        request.idempotency_key.clone(),
                    ));
                    slot.insert(fresh.clone());
                    (fresh, true)
                } else {
                    (existing, false)
                }
            }
            Entry::Vacant(slot) => {
                let fresh =
                    SharedRecord::new(SubmissionRecord::new(request.idempotency_key.clone()));
                slot.insert(fresh.clone());
                (fresh, true)
            }
        };

        if !claimed {
            tracing::debug!(
                idempotency_key = %request.idempotency_key,
                "submission already in flight, returning existing record"
            );
            return Ok(record);
        }

        self.drive(&request, &record).await;
        Ok(record)
    }

    /// Drive a freshly claimed record through signing and submission.
    async fn drive(&self, request: &TransactionRequest, record: &SharedRecord) {
        let trace_id = record.snapshot().trace_id;
        tracing::info!(
            trace_id = %trace_id,
            operation = ?request.kind(),
            product_id = request.payload.product_id(),
            "submitting transaction"
        );

        let unsigned = UnsignedEnvelope::from_request(request, self.network);
        let signed = match self.session.request_signature(&unsigned, self.network).await {
            Ok(signed) => signed,
            Err(e) => {
                let kind = wallet_error_kind(&e);
                tracing::warn!(trace_id = %trace_id, error = %e, "signature request failed");
                record.update(|r| r.fail(kind));
                metrics::record_submission_state("failed");
                return;
            }
        };

        record.update(|r| r.transition(SubmissionState::Signed));
        metrics::record_submission_state("signed");

        let mut retries_used = 0u32;
        loop {
            record.update(|r| r.attempts += 1);
            match self.ledger.submit_envelope(&signed).await {
                Ok(tx_id) => {
                    tracing::info!(trace_id = %trace_id, ledger_tx_id = %tx_id, "envelope accepted by ledger");
                    record.update(|r| {
                        r.transition(SubmissionState::Submitted);
                        r.ledger_tx_id = Some(tx_id);
                        r.last_error_kind = None;
                    });
                    metrics::record_submission_state("submitted");
                    return;
                }
                Err(e) if self.retry.should_retry(&e, retries_used) => {
                    retries_used += 1;
                    let delay = self.retry.delay_for(retries_used);
                    tracing::warn!(
                        trace_id = %trace_id,
                        error = %e,
                        retry = retries_used,
                        delay_ms = delay.as_millis() as u64,
                        "transient submission failure, retrying"
                    );
                    record.update(|r| r.last_error_kind = Some(ErrorKind::NetworkTransient));
                    metrics::record_retry();
                    sleep(delay).await;
                }
                Err(e) => {
                    let kind = if e.is_transient() {
                        ErrorKind::NetworkTransient
                    } else {
                        ErrorKind::NetworkPermanent
                    };
                    tracing::warn!(trace_id = %trace_id, error = %e, "submission failed permanently");
                    record.update(|r| r.fail(kind));
                    metrics::record_submission_state("failed");
                    return;
                }
            }
        }
    }

    /// Drop confirmed/failed records from the in-flight table.
    pub fn evict_terminal(&self) {
        self.in_flight.retain(|_, record| !record.state().is_terminal());
    }

    /// The tracked record for a key, if any.
    pub fn record(&self, key: &IdempotencyKey) -> Option<SharedRecord> {
        self.in_flight.get(key).map(|r| r.value().clone())
    }

    /// Number of tracked records (in-flight and terminal, pre-eviction).
    pub fn tracked(&self) -> usize {
        self.in_flight.len()
    }
}

fn wallet_error_kind(error: &WalletError) -> ErrorKind {
    match error {
        WalletError::ExtensionNotFound => ErrorKind::ExtensionNotFound,
        WalletError::AccessDenied => ErrorKind::AccessDenied,
        WalletError::KeyUnavailable(_) => ErrorKind::KeyUnavailable,
        WalletError::SignatureRejected(_) => ErrorKind::SignatureRejected,
        WalletError::SignatureTimeout(_) => ErrorKind::SignatureTimeout,
        WalletError::NotConnected => ErrorKind::WalletNotConnected,
    }
}
