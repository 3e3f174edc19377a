//! Per-repository client facade.
//!
//! # Data Flow
//! ```text
//! NavigatorFactory::navigator(code)
//!     → factory.rs (transport, auth and retry stages, REST client)
//!     → facade.rs (Navigator: search, read, resolve, write)
//!     → ResourceCache (one per navigator)
//! ```

pub mod facade;
pub mod factory;

pub use facade::Navigator;
pub use factory::NavigatorFactory;
