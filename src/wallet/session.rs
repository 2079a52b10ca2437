//! Wallet session lifecycle and signature requests.
//!
//! # Responsibilities
//! - Drive `disconnected → connecting → connected | error` transitions
//! - Serialize concurrent `connect()` calls against the extension
//! - Persist every transition as a whole snapshot
//! - Bound signature requests with a timeout
//!
//! The session is constructed once per process and shared by
//! reference; status and public key are single-writer (only
//! `connect`/`disconnect` mutate them) and many-reader.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use crate::ledger::Network;
use crate::observability::metrics;
use crate::tx::{SignedEnvelope, UnsignedEnvelope};
use crate::wallet::extension::{ExtensionError, WalletExtension};
use crate::wallet::store::{SessionSnapshot, SessionStore, WalletStatus};

/// Default bound on how long a signature prompt may stay open.
pub const DEFAULT_SIGNATURE_TIMEOUT_SECS: u64 = 120;

/// Errors surfaced by wallet session operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The extension is not installed or not reachable.
    #[error("wallet extension not found")]
    ExtensionNotFound,

    /// The user declined the authorization prompt.
    #[error("wallet access denied by user")]
    AccessDenied,

    /// Access was granted but the public key could not be retrieved.
    #[error("failed to retrieve public key: {0}")]
    KeyUnavailable(String),

    /// The user rejected or dismissed the signature prompt.
    #[error("signature request rejected: {0}")]
    SignatureRejected(String),

    /// No response from the extension within the bounded wait.
    #[error("signature request timed out after {0} seconds")]
    SignatureTimeout(u64),

    /// Operation requires a connected session.
    #[error("wallet not connected")]
    NotConnected,
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// Owned wallet session with an injected extension and persistence port.
pub struct WalletSession {
    extension: Arc<dyn WalletExtension>,
    store: Arc<dyn SessionStore>,
    /// Current snapshot; guarded for short, non-awaiting sections.
    state: Mutex<SessionSnapshot>,
    /// Serializes connect/disconnect so a second call awaits the first
    /// instead of racing the extension API.
    lifecycle_gate: tokio::sync::Mutex<()>,
    signature_timeout: Duration,
}

impl WalletSession {
    /// Create a fresh session in `disconnected` state.
    pub fn new(extension: Arc<dyn WalletExtension>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            extension,
            store,
            state: Mutex::new(SessionSnapshot::disconnected()),
            lifecycle_gate: tokio::sync::Mutex::new(()),
            signature_timeout: Duration::from_secs(DEFAULT_SIGNATURE_TIMEOUT_SECS),
        }
    }

    pub fn with_signature_timeout(mut self, timeout: Duration) -> Self {
        self.signature_timeout = timeout;
        self
    }

    /// Restore a session from the persisted snapshot.
    ///
    /// A restored `connected` status is stale-session risk: it is
    /// re-verified against the live extension and degraded to
    /// `disconnected` unless the extension still reports the same key.
    pub async fn restore(extension: Arc<dyn WalletExtension>, store: Arc<dyn SessionStore>) -> Self {
        let session = Self::new(extension, store);

        let loaded = match session.store.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load persisted wallet session");
                None
            }
        };

        let Some(snapshot) = loaded else {
            return session;
        };

        if !snapshot.is_consistent() {
            tracing::warn!("persisted wallet session is inconsistent, resetting");
            session.set_state(SessionSnapshot::disconnected());
            return session;
        }

        if snapshot.status == WalletStatus::Connected {
            let verified = session.verify_live(&snapshot).await;
            if verified {
                tracing::info!(
                    public_key = snapshot.public_key.as_deref().unwrap_or(""),
                    "restored wallet session"
                );
                session.set_state(snapshot);
            } else {
                tracing::info!("persisted wallet session no longer valid, resetting");
                session.set_state(SessionSnapshot::disconnected());
            }
        } else {
            // Transient statuses (connecting/error) do not survive a reload.
            session.set_state(SessionSnapshot::disconnected());
        }

        session
    }

    async fn verify_live(&self, snapshot: &SessionSnapshot) -> bool {
        if !self.extension.is_connected().await {
            return false;
        }
        match self.extension.get_public_key().await {
            Ok(key) => snapshot.public_key.as_deref() == Some(key.as_str()),
            Err(_) => false,
        }
    }

    /// Connect to the wallet extension.
    ///
    /// Concurrent calls are serialized; the second awaits the first.
    /// On success returns the account public key.
    pub async fn connect(&self) -> WalletResult<String> {
        let _gate = self.lifecycle_gate.lock().await;

        self.set_state(SessionSnapshot {
            status: WalletStatus::Connecting,
            public_key: None,
            last_error: None,
        });

        match self.try_connect().await {
            Ok(public_key) => {
                self.set_state(SessionSnapshot::connected(public_key.clone()));
                metrics::record_wallet_event("connected");
                tracing::info!(public_key = %public_key, "wallet connected");
                Ok(public_key)
            }
            Err(e) => {
                self.set_state(SessionSnapshot {
                    status: WalletStatus::Error,
                    public_key: None,
                    last_error: Some(e.to_string()),
                });
                metrics::record_wallet_event("connect_failed");
                tracing::warn!(error = %e, "wallet connect failed");
                Err(e)
            }
        }
    }

    async fn try_connect(&self) -> WalletResult<String> {
        if !self.extension.is_connected().await {
            return Err(WalletError::ExtensionNotFound);
        }
        if !self.extension.request_access().await {
            return Err(WalletError::AccessDenied);
        }
        match self.extension.get_public_key().await {
            Ok(key) if !key.is_empty() => Ok(key),
            Ok(_) => Err(WalletError::KeyUnavailable("extension returned an empty key".into())),
            Err(e) => Err(WalletError::KeyUnavailable(e.to_string())),
        }
    }

    /// Clear the local session. This cannot revoke the extension-side
    /// authorization; the grant remains until the user revokes it in
    /// the extension itself.
    pub async fn disconnect(&self) {
        let _gate = self.lifecycle_gate.lock().await;
        self.set_state(SessionSnapshot::disconnected());
        metrics::record_wallet_event("disconnected");
        tracing::info!("wallet session cleared locally; extension-side authorization persists");
    }

    /// Request a signature for the envelope, suspending until the user
    /// approves or rejects in the extension UI, bounded by the
    /// configured timeout.
    pub async fn request_signature(
        &self,
        envelope: &UnsignedEnvelope,
        network: Network,
    ) -> WalletResult<SignedEnvelope> {
        if self.status() != WalletStatus::Connected {
            return Err(WalletError::NotConnected);
        }

        let wait = self.signature_timeout;
        match timeout(wait, self.extension.sign_transaction(envelope, network)).await {
            Ok(Ok(signed)) => Ok(signed),
            Ok(Err(ExtensionError::Rejected)) => {
                Err(WalletError::SignatureRejected("user rejected the prompt".into()))
            }
            Ok(Err(ExtensionError::Unavailable(msg))) => Err(WalletError::SignatureRejected(msg)),
            Err(_) => Err(WalletError::SignatureTimeout(wait.as_secs())),
        }
    }

    pub fn status(&self) -> WalletStatus {
        self.lock().status
    }

    pub fn public_key(&self) -> Option<String> {
        self.lock().public_key.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.status() == WalletStatus::Connected
    }

    /// Current snapshot, for display.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SessionSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the in-memory snapshot and persist it as one unit.
    fn set_state(&self, snapshot: SessionSnapshot) {
        debug_assert!(snapshot.is_consistent());
        *self.lock() = snapshot.clone();
        if let Err(e) = self.store.save(&snapshot) {
            tracing::warn!(error = %e, "failed to persist wallet session snapshot");
        }
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("WalletSession")
            .field("status", &snapshot.status)
            .field("public_key", &snapshot.public_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{EventType, Payload};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use crate::wallet::store::MemorySessionStore;

    struct MockExtension {
        installed: bool,
        grant_access: bool,
        public_key: Option<String>,
        reject_signature: bool,
        sign_delay: Duration,
        access_calls: AtomicU32,
        in_flight: AtomicBool,
        overlapped: AtomicBool,
    }

    impl MockExtension {
        fn new(public_key: &str) -> Self {
            Self {
                installed: true,
                grant_access: true,
                public_key: Some(public_key.to_string()),
                reject_signature: false,
                sign_delay: Duration::ZERO,
                access_calls: AtomicU32::new(0),
                in_flight: AtomicBool::new(false),
                overlapped: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl WalletExtension for MockExtension {
        async fn is_connected(&self) -> bool {
            self.installed
        }

        async fn request_access(&self) -> bool {
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            self.access_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.store(false, Ordering::SeqCst);
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
            tokio::time::sleep(self.sign_delay).await;
            if self.reject_signature {
                return Err(ExtensionError::Rejected);
            }
            Ok(SignedEnvelope {
                envelope: envelope.clone(),
                signature: "mock-signature".to_string(),
            })
        }
    }

    fn sample_envelope() -> UnsignedEnvelope {
        UnsignedEnvelope {
            source: "GABC".to_string(),
            operation: Payload::LogEvent {
                product_id: "PRD-1".to_string(),
                event_type: EventType::Ship,
                location: "warehouse 4".to_string(),
                notes: None,
            },
            network: Network::Testnet,
        }
    }

    #[tokio::test]
    async fn test_connect_happy_path() {
        let session = WalletSession::new(
            Arc::new(MockExtension::new("GABC123")),
            Arc::new(MemorySessionStore::new()),
        );
        let key = session.connect().await.unwrap();
        assert_eq!(key, "GABC123");
        assert_eq!(session.status(), WalletStatus::Connected);
        assert_eq!(session.public_key(), Some("GABC123".to_string()));
    }

    #[tokio::test]
    async fn test_connect_extension_missing() {
        let mut ext = MockExtension::new("GABC");
        ext.installed = false;
        let session = WalletSession::new(Arc::new(ext), Arc::new(MemorySessionStore::new()));
        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, WalletError::ExtensionNotFound));
        assert_eq!(session.status(), WalletStatus::Error);
        assert!(session.public_key().is_none());
    }

    #[tokio::test]
    async fn test_connect_access_denied() {
        let mut ext = MockExtension::new("GABC");
        ext.grant_access = false;
        let session = WalletSession::new(Arc::new(ext), Arc::new(MemorySessionStore::new()));
        assert!(matches!(session.connect().await, Err(WalletError::AccessDenied)));
        assert!(session.last_error().unwrap().contains("denied"));
    }

    #[tokio::test]
    async fn test_connect_key_unavailable() {
        let mut ext = MockExtension::new("GABC");
        ext.public_key = None;
        let session = WalletSession::new(Arc::new(ext), Arc::new(MemorySessionStore::new()));
        assert!(matches!(
            session.connect().await,
            Err(WalletError::KeyUnavailable(_))
        ));
        // Never connected-without-key.
        assert!(session.snapshot().is_consistent());
    }

    #[tokio::test]
    async fn test_concurrent_connects_are_serialized() {
        let ext = Arc::new(MockExtension::new("GABC"));
        let session = Arc::new(WalletSession::new(
            ext.clone(),
            Arc::new(MemorySessionStore::new()),
        ));

        let a = tokio::spawn({
            let s = session.clone();
            async move { s.connect().await }
        });
        let b = tokio::spawn({
            let s = session.clone();
            async move { s.connect().await }
        });

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert!(!ext.overlapped.load(Ordering::SeqCst));
        assert_eq!(ext.access_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disconnect_is_local_only() {
        let store = Arc::new(MemorySessionStore::new());
        let session = WalletSession::new(Arc::new(MockExtension::new("GABC")), store.clone());
        session.connect().await.unwrap();
        session.disconnect().await;

        assert_eq!(session.status(), WalletStatus::Disconnected);
        assert!(session.public_key().is_none());
        // Persisted state cleared too.
        assert_eq!(store.load().unwrap(), Some(SessionSnapshot::disconnected()));
    }

    #[tokio::test]
    async fn test_restore_verifies_against_live_extension() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .save(&SessionSnapshot::connected("GABC123".into()))
            .unwrap();

        // Extension still grants the same key: session restores connected.
        let session =
            WalletSession::restore(Arc::new(MockExtension::new("GABC123")), store.clone()).await;
        assert_eq!(session.status(), WalletStatus::Connected);

        // Extension now reports a different account: stale session dropped.
        let session =
            WalletSession::restore(Arc::new(MockExtension::new("GOTHER")), store.clone()).await;
        assert_eq!(session.status(), WalletStatus::Disconnected);

        // Extension gone entirely.
        store
            .save(&SessionSnapshot::connected("GABC123".into()))
            .unwrap();
        let mut ext = MockExtension::new("GABC123");
        ext.installed = false;
        let session = WalletSession::restore(Arc::new(ext), store).await;
        assert_eq!(session.status(), WalletStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_restore_rejects_inconsistent_snapshot() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .save(&SessionSnapshot {
                status: WalletStatus::Connected,
                public_key: None,
                last_error: None,
            })
            .unwrap();

        let session = WalletSession::restore(Arc::new(MockExtension::new("GABC")), store).await;
        assert_eq!(session.status(), WalletStatus::Disconnected);
        assert!(session.snapshot().is_consistent());
    }

    #[tokio::test]
    async fn test_signature_requires_connection() {
        let session = WalletSession::new(
            Arc::new(MockExtension::new("GABC")),
            Arc::new(MemorySessionStore::new()),
        );
        let err = session
            .request_signature(&sample_envelope(), Network::Testnet)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::NotConnected));
    }

    #[tokio::test]
    async fn test_signature_rejection() {
        let mut ext = MockExtension::new("GABC");
        ext.reject_signature = true;
        let session = WalletSession::new(Arc::new(ext), Arc::new(MemorySessionStore::new()));
        session.connect().await.unwrap();
        let err = session
            .request_signature(&sample_envelope(), Network::Testnet)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::SignatureRejected(_)));
    }

    #[tokio::test]
    async fn test_signature_timeout() {
        let mut ext = MockExtension::new("GABC");
        ext.sign_delay = Duration::from_secs(5);
        let session = WalletSession::new(Arc::new(ext), Arc::new(MemorySessionStore::new()))
            .with_signature_timeout(Duration::from_millis(50));
        session.connect().await.unwrap();
        let err = session
            .request_signature(&sample_envelope(), Network::Testnet)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::SignatureTimeout(_)));
    }
}
