//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config, overridable via `RUST_LOG`
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Library code only emits events; installing a subscriber is the binary's job

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directive when neither `RUST_LOG` nor config specify one.
pub const DEFAULT_DIRECTIVE: &str = "fhir_navigator=info";

/// Build the filter: `RUST_LOG` wins, then the configured level.
pub fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = if log_level.trim().is_empty() {
            DEFAULT_DIRECTIVE.to_string()
        } else {
            format!("fhir_navigator={}", log_level.trim())
        };
        EnvFilter::new(directive)
    })
}

/// Install the global fmt subscriber.
///
/// Returns false if a subscriber was already installed.
pub fn init_logging(log_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(build_filter(log_level))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
