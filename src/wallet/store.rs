//! Session snapshot persistence.
//!
//! The session is persisted as a whole snapshot so a crash or reload
//! can never observe a connected status without its public key.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Connection status of the wallet session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// The unit of persistence: status, key, and last error together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: WalletStatus,
    pub public_key: Option<String>,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(public_key: String) -> Self {
        Self {
            status: WalletStatus::Connected,
            public_key: Some(public_key),
            last_error: None,
        }
    }

    /// Invariant check: `public_key` is set iff status is connected.
    pub fn is_consistent(&self) -> bool {
        (self.status == WalletStatus::Connected) == self.public_key.is_some()
    }
}

/// Persistence port for the wallet session.
pub trait SessionStore: Send + Sync {
    /// Load the last persisted snapshot, if any.
    fn load(&self) -> std::io::Result<Option<SessionSnapshot>>;

    /// Persist the snapshot as a whole.
    fn save(&self, snapshot: &SessionSnapshot) -> std::io::Result<()>;
}

/// JSON-file-backed store. Writes go to a temp file and are renamed
/// into place so the snapshot on disk is always complete.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> std::io::Result<Option<SessionSnapshot>> {
        if !Path::new(&self.path).exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str::<SessionSnapshot>(&content) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding unreadable session file");
                Ok(None)
            }
        }
    }

    fn save(&self, snapshot: &SessionSnapshot) -> std::io::Result<()> {
        let body = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<SessionSnapshot>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> std::io::Result<Option<SessionSnapshot>> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, snapshot: &SessionSnapshot) -> std::io::Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        Ok(())
    }
}
