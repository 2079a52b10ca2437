//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Ledger call fails:
//!     → retries.rs (classify transient vs permanent, check budget)
//!     → backoff.rs (jittered exponential delay)
//!     → retry or surface the failure
//! ```
//!
//! # Design Decisions
//! - Transient failures (timeout, rate limit) retried up to a bounded count
//! - Permanent failures (malformed envelope, insufficient balance) never retried
//! - Jittered backoff prevents synchronized retry storms

pub mod backoff;
pub mod retries;

pub use backoff::calculate_backoff;
pub use retries::RetryPolicy;
