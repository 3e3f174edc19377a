//! Lifecycle of in-flight work.
//!
//! A factory holds the root [`Cancellation`]; each navigator it builds gets a
//! child. Cancelling a navigator stops only its own retries. Cancelling the
//! root stops every navigator, for shutdown.

pub mod cancel;

pub use cancel::Cancellation;
