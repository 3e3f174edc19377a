//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request:
//!     → handler.rs (attach credentials, refresh on expiry or 401/403)
//!     → store.rs (shared token per repository code)
//!     → oauth.rs (client-credentials grant via retry-only pipeline)
//! ```
//!
//! # Design Decisions
//! - The store lock guards only the in-memory check and insert
//! - Two racing refreshes are acceptable; the last stored token wins

pub mod handler;
pub mod oauth;
pub mod store;
pub mod token;

pub use handler::{AuthenticationStage, X_API_KEY};
pub use oauth::{ClientCredentialsProvider, TokenProvider};
pub use store::TokenStore;
pub use token::{BearerToken, DEFAULT_REFRESH_THRESHOLD};
