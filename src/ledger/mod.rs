//! Ledger network subsystem.
//!
//! # Data Flow
//! ```text
//! Signed envelope
//!     → client.rs (port: submit, status, product lookups)
//!     → http.rs (gateway client, timeouts, failover, classification)
//! ```
//!
//! # Design Decisions
//! - The wire format is the gateway's concern; the core sees ids and statuses
//! - Every gateway call has a deadline
//! - Transient/permanent classification happens at this boundary only

pub mod client;
pub mod http;
pub mod types;

pub use client::LedgerClient;
pub use http::HttpLedgerClient;
pub use types::{LedgerError, LedgerResult, Network, ProductRecord, TrackingEvent, TxStatus};
