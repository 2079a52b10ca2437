//! Verification subsystem.
//!
//! # Data Flow
//! ```text
//! Verification link (<base>/verify/<productId>)
//!     → link.rs (URL construction, path-safety checks)
//!     → resolver.rs (read-only ledger lookup, ordered history)
//! ```
//!
//! # Design Decisions
//! - Resolution is read-only and independent of the wallet session
//! - Event history is ordered oldest first: registration leads
//! - QR image generation belongs to the UI layer, not here

pub mod link;
pub mod resolver;

pub use link::{verification_url, LinkError};
pub use resolver::{ProductLedgerView, ResolveError, VerificationResolver};
