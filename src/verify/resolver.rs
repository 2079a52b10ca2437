//! Read-only product verification lookups.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::ledger::{LedgerClient, LedgerError, ProductRecord, TrackingEvent};

/// Errors from verification lookups.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The identifier has no registered history on the ledger.
    #[error("no product registered under id '{0}'")]
    NotFound(String),

    /// The ledger could not be queried.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A product's last known ledger state: current record plus its event
/// history ordered oldest first, so the registration leads the journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLedgerView {
    pub product: ProductRecord,
    pub events: Vec<TrackingEvent>,
}

/// Resolves product identifiers against the ledger for third-party
/// verification. Read-only; depends on nothing but the ledger client.
pub struct VerificationResolver {
    ledger: Arc<dyn LedgerClient>,
}

impl VerificationResolver {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Look up the current status and ordered event history for a
    /// product id. Pure function of ledger state; no mutation.
    pub async fn resolve(&self, product_id: &str) -> Result<ProductLedgerView, ResolveError> {
        let product = self
            .ledger
            .product(product_id)
            .await?
            .ok_or_else(|| ResolveError::NotFound(product_id.to_string()))?;

        let mut events = self.ledger.product_events(product_id).await?;
        events.sort_by_key(|e| e.recorded_at);

        tracing::debug!(
            product_id = %product_id,
            events = events.len(),
            "resolved product ledger view"
        );

        Ok(ProductLedgerView { product, events })
    }
}
