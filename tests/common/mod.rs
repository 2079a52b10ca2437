//! Shared test doubles: a scriptable wallet extension and ledger gateway.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chain_logistics::ledger::{
    LedgerClient, LedgerError, LedgerResult, Network, ProductRecord, TrackingEvent, TxStatus,
};
use chain_logistics::tx::{EventType, Payload, SignedEnvelope, UnsignedEnvelope};
use chain_logistics::wallet::{ExtensionError, WalletExtension};

/// Wallet extension double with scriptable behavior.
pub struct MockExtension {
    pub installed: bool,
    pub grant_access: bool,
    pub public_key: Option<String>,
    pub reject_signature: bool,
    pub sign_delay: Duration,
    pub sign_calls: AtomicU32,
}

impl MockExtension {
    pub fn granting(public_key: &str) -> Self {
        Self {
            installed: true,
            grant_access: true,
            public_key: Some(public_key.to_string()),
            reject_signature: false,
            sign_delay: Duration::ZERO,
            sign_calls: AtomicU32::new(0),
        }
    }

    pub fn signatures_requested(&self) -> u32 {
        self.sign_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletExtension for MockExtension {
    async fn is_connected(&self) -> bool {
        self.installed
    }

    async fn request_access(&self) -> bool {
        self.grant_access
    }

    async fn get_public_key(&self) -> Result<String, ExtensionError> {
        self.public_key
            .clone()
            .ok_or_else(|| ExtensionError::Unavailable("no account".into()))
    }

    async fn sign_transaction(
        &self,
        envelope: &UnsignedEnvelope,
        _network: Network,
    ) -> Result<SignedEnvelope, ExtensionError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.sign_delay).await;
        if self.reject_signature {
            return Err(ExtensionError::Rejected);
        }
        Ok(SignedEnvelope {
            envelope: envelope.clone(),
            signature: format!("sig-{}", envelope.source),
        })
    }
}

/// In-memory ledger gateway double.
///
/// Envelopes are applied to the product store on submission; statuses
/// stay pending for a configurable number of polls before confirming.
/// Submission and status errors can be scripted up front.
#[derive(Default)]
pub struct ScriptedLedger {
    next_tx: AtomicU32,
    submit_count: AtomicU32,
    /// Errors returned by upcoming submissions, in order.
    submit_errors: Mutex<VecDeque<LedgerError>>,
    /// Errors returned by upcoming status queries, in order.
    status_errors: Mutex<VecDeque<LedgerError>>,
    /// Number of status polls before a transaction confirms.
    confirm_after_polls: u32,
    /// When set, every status query reports pending forever.
    hold_pending: bool,
    /// When set, every status query reports failure with this reason.
    fail_with_reason: Option<String>,
    polls: Mutex<HashMap<String, u32>>,
    products: Mutex<HashMap<String, ProductRecord>>,
    events: Mutex<HashMap<String, Vec<TrackingEvent>>>,
}

impl ScriptedLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn confirming_after(polls: u32) -> Arc<Self> {
        Arc::new(Self {
            confirm_after_polls: polls,
            ..Self::default()
        })
    }

    pub fn holding_pending() -> Arc<Self> {
        Arc::new(Self {
            hold_pending: true,
            ..Self::default()
        })
    }

    pub fn failing_with(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with_reason: Some(reason.to_string()),
            ..Self::default()
        })
    }

    pub fn script_submit_errors(&self, errors: Vec<LedgerError>) {
        self.submit_errors.lock().unwrap().extend(errors);
    }

    pub fn script_status_errors(&self, errors: Vec<LedgerError>) {
        self.status_errors.lock().unwrap().extend(errors);
    }

    pub fn submissions(&self) -> u32 {
        self.submit_count.load(Ordering::SeqCst)
    }

    fn apply(&self, envelope: &SignedEnvelope) {
        let now = Utc::now();
        match &envelope.envelope.operation {
            Payload::RegisterProduct {
                id,
                name,
                origin,
                description,
                category,
            } => {
                self.products.lock().unwrap().insert(
                    id.clone(),
                    ProductRecord {
                        id: id.clone(),
                        name: name.clone(),
                        origin: origin.clone(),
                        category: category.clone(),
                        description: description.clone(),
                        registered_by: envelope.envelope.source.clone(),
                        registered_at: now,
                    },
                );
                // The gateway records registration as the first history entry.
                self.events.lock().unwrap().entry(id.clone()).or_default().push(
                    TrackingEvent {
                        event_type: EventType::Registered,
                        location: origin.clone(),
                        notes: None,
                        recorded_by: envelope.envelope.source.clone(),
                        recorded_at: now,
                    },
                );
            }
            Payload::LogEvent {
                product_id,
                event_type,
                location,
                notes,
            } => {
                self.events
                    .lock()
                    .unwrap()
                    .entry(product_id.clone())
                    .or_default()
                    .push(TrackingEvent {
                        event_type: *event_type,
                        location: location.clone(),
                        notes: notes.clone(),
                        recorded_by: envelope.envelope.source.clone(),
                        recorded_at: now,
                    });
            }
        }
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn submit_envelope(&self, envelope: &SignedEnvelope) -> LedgerResult<String> {
        if let Some(err) = self.submit_errors.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.submit_count.fetch_add(1, Ordering::SeqCst);
        self.apply(envelope);
        let tx_id = format!("tx-{}", self.next_tx.fetch_add(1, Ordering::SeqCst) + 1);
        Ok(tx_id)
    }

    async fn transaction_status(&self, tx_id: &str) -> LedgerResult<TxStatus> {
        if let Some(err) = self.status_errors.lock().unwrap().pop_front() {
            return Err(err);
        }
        if self.hold_pending {
            return Ok(TxStatus::Pending);
        }
        if let Some(reason) = &self.fail_with_reason {
            return Ok(TxStatus::Failed {
                reason: Some(reason.clone()),
            });
        }
        let mut polls = self.polls.lock().unwrap();
        let seen = polls.entry(tx_id.to_string()).or_insert(0);
        *seen += 1;
        if *seen > self.confirm_after_polls {
            Ok(TxStatus::Confirmed)
        } else {
            Ok(TxStatus::Pending)
        }
    }

    async fn product(&self, product_id: &str) -> LedgerResult<Option<ProductRecord>> {
        Ok(self.products.lock().unwrap().get(product_id).cloned())
    }

    async fn product_events(&self, product_id: &str) -> LedgerResult<Vec<TrackingEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .get(product_id)
            .cloned()
            .unwrap_or_default())
    }
}
