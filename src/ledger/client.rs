//! Ledger client port.

use async_trait::async_trait;

use crate::ledger::types::{LedgerResult, ProductRecord, TrackingEvent, TxStatus};
use crate::tx::SignedEnvelope;

/// Read/write access to the ledger network.
///
/// The wire format is external-system-defined; the core only depends
/// on submission returning a transaction identifier and status queries
/// returning pending/confirmed/failed.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a signed envelope. Returns the ledger transaction id.
    async fn submit_envelope(&self, envelope: &SignedEnvelope) -> LedgerResult<String>;

    /// Query the status of a previously submitted transaction.
    async fn transaction_status(&self, tx_id: &str) -> LedgerResult<TxStatus>;

    /// Look up a registered product. `None` when the id is unknown.
    async fn product(&self, product_id: &str) -> LedgerResult<Option<ProductRecord>>;

    /// Ordered event history for a product. Empty when none recorded.
    async fn product_events(&self, product_id: &str) -> LedgerResult<Vec<TrackingEvent>>;
}
