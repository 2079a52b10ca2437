//! Transaction construction and submission subsystem.
//!
//! # Data Flow
//! ```text
//! Form payload
//!     → validate.rs (per-kind schema, all violations reported)
//!     → request.rs (immutable request + idempotency fingerprint)
//!     → submitter.rs (signature, ledger hand-off, dedup per key)
//!     → record.rs (pending → signed → submitted → confirmed | failed)
//! ```
//!
//! # Design Decisions
//! - At most one in-flight submission per idempotency key
//! - Duplicate submits return the existing record, no second prompt
//! - Transient network failures retried with backoff; permanent ones never

pub mod record;
pub mod request;
pub mod submitter;
pub mod validate;

pub use record::{ErrorKind, SharedRecord, SubmissionRecord, SubmissionState};
pub use request::{
    EventType, IdempotencyKey, OperationKind, Payload, SignedEnvelope, TransactionRequest,
    UnsignedEnvelope,
};
pub use submitter::{SubmitError, TransactionSubmitter};
pub use validate::{FieldError, ValidationError};
