//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config
//! files; every field has a default so minimal configs work. The
//! numeric thresholds are tunable defaults, not protocol constants.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ledger::Network;
use crate::resilience::RetryPolicy;

/// Root configuration for the traceability core.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Ledger gateway settings.
    pub ledger: LedgerConfig,

    /// Wallet session settings.
    pub wallet: WalletConfig,

    /// Submission retry and confirmation tracking settings.
    pub submission: SubmissionConfig,

    /// Public verification link settings.
    pub verification: VerificationConfig,
}

/// Ledger gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Primary gateway base URL.
    pub base_url: String,

    /// Failover gateway base URLs, tried in order.
    pub failover_urls: Vec<String>,

    /// Per-request deadline in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            failover_urls: Vec::new(),
            request_timeout_secs: 10,
        }
    }
}

/// Wallet session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Which ledger network signatures are requested for.
    pub network: Network,

    /// Bound on how long a signature prompt may stay open.
    pub signature_timeout_secs: u64,

    /// Path of the persisted session snapshot.
    pub session_file: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            signature_timeout_secs: 120,
            session_file: "wallet-session.json".to_string(),
        }
    }
}

impl WalletConfig {
    pub fn signature_timeout(&self) -> Duration {
        Duration::from_secs(self.signature_timeout_secs)
    }
}

/// Submission retry and tracking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Maximum retries for transient failures after the initial attempt.
    pub max_retries: u32,

    /// Base backoff delay in milliseconds.
    pub backoff_base_ms: u64,

    /// Backoff cap in milliseconds.
    pub backoff_max_ms: u64,

    /// Confirmation polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Maximum confirmation tracking window in seconds.
    pub max_wait_secs: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 250,
            backoff_max_ms: 5_000,
            poll_interval_ms: 2_000,
            max_wait_secs: 120,
        }
    }
}

impl SubmissionConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff_base_ms: self.backoff_base_ms,
            backoff_max_ms: self.backoff_max_ms,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
}

/// Public verification link configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Base URL the verification links (and QR codes) point at.
    pub base_url: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}
