//! Ledger-specific types and error definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ledger network selector, passed to the wallet extension when signing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Network {
    /// Test network (default for development).
    #[default]
    Testnet,
    /// Public production network.
    Public,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "TESTNET",
            Network::Public => "PUBLIC",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when talking to the ledger gateway.
///
/// The transient/permanent split drives the retry policy: transient
/// failures are retried with backoff, permanent failures propagate
/// immediately.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Recoverable failure (timeout, rate limit, gateway unreachable).
    #[error("transient ledger error: {0}")]
    Transient(String),

    /// Non-recoverable rejection (malformed envelope, insufficient balance).
    #[error("permanent ledger error: {0}")]
    Permanent(String),

    /// Request exceeded the configured deadline.
    #[error("ledger request timed out after {0} seconds")]
    Timeout(u64),
}

impl LedgerError {
    /// Whether this failure is worth retrying.
    pub fn is_transient(&self) -> bool {
        !matches!(self, LedgerError::Permanent(_))
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Status of a submitted transaction as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TxStatus {
    /// Accepted by the network, not yet included in a ledger close.
    Pending,
    /// Included and final.
    Confirmed,
    /// Rejected by the network.
    Failed {
        /// Human-readable failure reason, when the gateway provides one.
        #[serde(default)]
        reason: Option<String>,
    },
}

/// A registered product as recorded on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub origin: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Public key of the account that registered the product.
    pub registered_by: String,
    pub registered_at: DateTime<Utc>,
}

/// A single tracking event in a product's journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub event_type: crate::tx::EventType,
    pub location: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Public key of the account that logged the event.
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}
