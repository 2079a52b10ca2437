//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! Browser extension (injected API)
//!     → extension.rs (opaque capability port)
//!     → session.rs (connect/disconnect lifecycle, signature requests)
//!     → store.rs (whole-snapshot persistence across reloads)
//! ```
//!
//! # Design Decisions
//! - Session is an owned object with injected ports, not an ambient singleton
//! - Concurrent connect() calls are serialized, never raced
//! - Persisted connected state is re-verified before being trusted
//! - Disconnect is local-only; the extension-side grant cannot be revoked

pub mod extension;
pub mod session;
pub mod store;

pub use extension::{ExtensionError, WalletExtension};
pub use session::{WalletError, WalletResult, WalletSession};
pub use store::{FileSessionStore, MemorySessionStore, SessionSnapshot, SessionStore, WalletStatus};
