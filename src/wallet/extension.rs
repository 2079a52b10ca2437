//! Port to the browser wallet extension.
//!
//! The extension is an opaque capability: the session only needs
//! presence detection, an authorization grant, the account public key,
//! and a signing call that suspends until the user acts in the
//! extension's own UI.

use async_trait::async_trait;
use thiserror::Error;

use crate::ledger::Network;
use crate::tx::{SignedEnvelope, UnsignedEnvelope};

/// Failures originating inside the extension.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// The user dismissed or rejected the prompt.
    #[error("request rejected by user")]
    Rejected,

    /// The extension call itself failed.
    #[error("extension call failed: {0}")]
    Unavailable(String),
}

/// Injected wallet extension API.
///
/// Mirrors the surface a browser extension exposes: `is_connected`
/// reports installation, `request_access` prompts for authorization,
/// and `sign_transaction` suspends for user interaction.
#[async_trait]
pub trait WalletExtension: Send + Sync {
    /// Whether the extension is installed and reachable.
    async fn is_connected(&self) -> bool;

    /// Prompt the user for authorization. `false` means declined.
    async fn request_access(&self) -> bool;

    /// Retrieve the authorized account's public key.
    async fn get_public_key(&self) -> Result<String, ExtensionError>;

    /// Ask the user to sign the envelope for the given network.
    /// Suspends until the user approves or rejects.
    async fn sign_transaction(
        &self,
        envelope: &UnsignedEnvelope,
        network: Network,
    ) -> Result<SignedEnvelope, ExtensionError>;
}
