//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → NavigatorConfig (validated, immutable)
//!     → shared via Arc to every navigator and pipeline
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the process loads it once
//! - Optional fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::NavigatorConfig;
pub use schema::ProxyConfig;
pub use schema::RepositoryConfig;
pub use schema::RetryConfig;
pub use schema::TimeoutConfig;
