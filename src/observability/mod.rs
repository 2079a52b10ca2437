//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with a per-submission trace id
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout via tracing-subscriber)
//!     → Whatever metrics recorder the host process installs
//! ```

pub mod logging;
pub mod metrics;
