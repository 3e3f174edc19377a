//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms via metrics)
//!
//! Consumers:
//!     → Log output (stdout via the fmt layer)
//!     → Whatever metrics recorder the host process installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (repository, attempt, status) on every event
//! - Metrics are cheap and silent without a recorder

pub mod logging;
pub mod metrics;
