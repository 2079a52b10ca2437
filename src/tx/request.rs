//! Transaction request construction and the idempotency fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ledger::Network;
use crate::tx::validate::{validate, ValidationError};

/// The kind of ledger operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    RegisterProduct,
    LogEvent,
}

/// Supply-chain event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Recorded by the ledger gateway when a product is registered;
    /// reserved, not loggable through `LOG_EVENT`.
    Registered,
    Harvest,
    Process,
    Package,
    Ship,
    Receive,
    QualityCheck,
    Transfer,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Registered => "REGISTERED",
            EventType::Harvest => "HARVEST",
            EventType::Process => "PROCESS",
            EventType::Package => "PACKAGE",
            EventType::Ship => "SHIP",
            EventType::Receive => "RECEIVE",
            EventType::QualityCheck => "QUALITY_CHECK",
            EventType::Transfer => "TRANSFER",
        }
    }
}

/// Operation payload, tagged by kind. Each variant carries its own
/// required-field set; validation is enumerated per kind in
/// [`crate::tx::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Payload {
    RegisterProduct {
        id: String,
        name: String,
        origin: String,
        #[serde(default)]
        description: Option<String>,
        category: String,
    },
    LogEvent {
        product_id: String,
        event_type: EventType,
        location: String,
        #[serde(default)]
        notes: Option<String>,
    },
}

impl Payload {
    pub fn kind(&self) -> OperationKind {
        match self {
            Payload::RegisterProduct { .. } => OperationKind::RegisterProduct,
            Payload::LogEvent { .. } => OperationKind::LogEvent,
        }
    }

    /// The product identifier this operation concerns.
    pub fn product_id(&self) -> &str {
        match self {
            Payload::RegisterProduct { id, .. } => id,
            Payload::LogEvent { product_id, .. } => product_id,
        }
    }

    /// Canonical field-by-field rendering used for the idempotency
    /// fingerprint. Field order is fixed; optional fields render empty.
    fn canonical(&self) -> String {
        match self {
            Payload::RegisterProduct {
                id,
                name,
                origin,
                description,
                category,
            } => format!(
                "REGISTER_PRODUCT\n{id}\n{name}\n{origin}\n{}\n{category}",
                description.as_deref().unwrap_or("")
            ),
            Payload::LogEvent {
                product_id,
                event_type,
                location,
                notes,
            } => format!(
                "LOG_EVENT\n{product_id}\n{}\n{location}\n{}",
                event_type.as_str(),
                notes.as_deref().unwrap_or("")
            ),
        }
    }
}

/// Deterministic fingerprint of payload + submitter, used to de-duplicate
/// submissions across retries and concurrent callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Derive the key as hex(SHA-256(submitter || payload)).
    pub fn derive(payload: &Payload, submitter: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(submitter.as_bytes());
        hasher.update([0u8]);
        hasher.update(payload.canonical().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated, immutable ledger transaction request.
///
/// Built once per form submission via [`TransactionRequest::build`] and
/// consumed exactly once by the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub payload: Payload,
    /// Public key of the submitting account.
    pub submitter: String,
    pub idempotency_key: IdempotencyKey,
}

impl TransactionRequest {
    /// Validate the payload against its per-kind schema and build an
    /// immutable request. Reports every violated field, not just the first.
    pub fn build(payload: Payload, submitter: &str) -> Result<Self, ValidationError> {
        validate(&payload)?;
        let idempotency_key = IdempotencyKey::derive(&payload, submitter);
        Ok(Self {
            payload,
            submitter: submitter.to_string(),
            idempotency_key,
        })
    }

    pub fn kind(&self) -> OperationKind {
        self.payload.kind()
    }
}

/// A signable transaction envelope prior to signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedEnvelope {
    /// Public key of the source account.
    pub source: String,
    pub operation: Payload,
    pub network: Network,
}

impl UnsignedEnvelope {
    pub fn from_request(request: &TransactionRequest, network: Network) -> Self {
        Self {
            source: request.submitter.clone(),
            operation: request.payload.clone(),
            network,
        }
    }
}

/// An envelope carrying the extension-produced signature, ready for
/// submission to the ledger network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    pub envelope: UnsignedEnvelope,
    pub signature: String,
}
