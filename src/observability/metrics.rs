//! Metrics collection.
//!
//! # Metrics
//! - `logistics_submissions_total` (counter): submissions by state reached
//! - `logistics_submit_retries_total` (counter): transient retries spent
//! - `logistics_wallet_events_total` (counter): session lifecycle events
//! - `logistics_ledger_up` (gauge): 1=gateway healthy, 0=unreachable
//!
//! Updates are cheap atomic operations; exposition is left to whatever
//! recorder the embedding process installs.

use metrics::{counter, gauge};

/// Record a submission reaching a lifecycle state.
pub fn record_submission_state(state: &'static str) {
    counter!("logistics_submissions_total", "state" => state).increment(1);
}

/// Record one transient retry being spent.
pub fn record_retry() {
    counter!("logistics_submit_retries_total").increment(1);
}

/// Record a wallet session lifecycle event.
pub fn record_wallet_event(event: &'static str) {
    counter!("logistics_wallet_events_total", "event" => event).increment(1);
}

/// Record ledger gateway health.
pub fn record_ledger_health(healthy: bool) {
    gauge!("logistics_ledger_up").set(if healthy { 1.0 } else { 0.0 });
}
