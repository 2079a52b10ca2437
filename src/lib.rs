//! Supply-chain traceability core
//!
//! Wallet session, ledger transaction submission, confirmation
//! tracking, and third-party product verification for a supply-chain
//! traceability application. The UI layer (forms, QR widgets,
//! navigation) consumes this crate through `build`, `submit`,
//! `track_until_terminal`, and `resolve`.
//!
//! # Architecture Overview
//!
//! ```text
//!   Form payload                 ┌──────────────────────────────────────────────┐
//!   ─────────────────────────────┼─▶ tx::build ───▶ tx::submitter               │
//!                                │       │               │                      │
//!                                │  (validation,         ▼                      │
//!                                │   idempotency    wallet::session ──▶ browser │
//!                                │   fingerprint)   (sign, bounded     extension│
//!                                │                   wait)                      │
//!                                │                       │                      │
//!                                │                       ▼                      │
//!                                │                  ledger::http ─────▶ ledger  │
//!                                │                  (submit, retry)    gateway  │
//!                                │                       │                      │
//!   Record (confirmed/failed) ◀──┼── tracker ◀───────────┘                      │
//!                                │  (poll, cancel, bounded wait)                │
//!                                │                                              │
//!   Verify link (/verify/<id>) ──┼─▶ verify::resolver ──▶ ledger (read-only)    │
//!                                │                                              │
//!                                │  ┌────────────────────────────────────────┐  │
//!                                │  │          Cross-Cutting Concerns        │  │
//!                                │  │  config   resilience   observability   │  │
//!                                │  └────────────────────────────────────────┘  │
//!                                └──────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod ledger;
pub mod tracker;
pub mod tx;
pub mod verify;
pub mod wallet;

// Cross-cutting concerns
pub mod config;
pub mod observability;
pub mod resilience;

pub use config::AppConfig;
pub use ledger::{HttpLedgerClient, LedgerClient, Network};
pub use tracker::{CancelToken, SubmissionTracker};
pub use tx::{SharedRecord, SubmissionRecord, TransactionRequest, TransactionSubmitter};
pub use verify::{VerificationResolver, verification_url};
pub use wallet::{WalletSession, WalletStatus};
