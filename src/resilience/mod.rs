//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to repository:
//!     → retries.rs (send, classify outcome, wait, resend)
//!     → jitter.rs (decorrelated delay sequence, drawn once per call)
//!     → Retry-After header overrides the jittered delay
//! ```
//!
//! # Design Decisions
//! - Timeouts are enforced by the transport; a timeout counts as transient
//! - Bounded attempts (10), never an unbounded loop
//! - Waits race the cancellation signal

pub mod jitter;
pub mod retries;

pub use jitter::{DecorrelatedJitter, Jitter};
pub use retries::{is_retryable_status, RetryPolicy, RetryStage, MAX_ATTEMPTS};
