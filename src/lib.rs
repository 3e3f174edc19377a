//! FHIR repository navigator.
//!
//! Resolves FHIR references, caches resources per session, pages through
//! searches and talks to one or more FHIR REST servers with retries and
//! OAuth2, Basic or API key authentication.

// Core model
pub mod model;
pub mod reference;

// Transport and REST client
pub mod auth;
pub mod client;
pub mod http;
pub mod resilience;

// Session
pub mod cache;
pub mod navigator;
pub mod search;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;

#[cfg(test)]
mod test_support;

pub use config::NavigatorConfig;
pub use error::{NavigatorError, NavigatorResult};
pub use navigator::{Navigator, NavigatorFactory};
pub use reference::{ParsedReference, ReferenceResolver};
