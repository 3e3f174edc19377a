//! Reference resolution subsystem.
//!
//! # Data Flow
//! ```text
//! reference string
//!     → resolver.rs (decode, split query, strip root, walk segments)
//!     → resource_types.rs (known type names, canonical casing)
//!     → parsed.rs (ParsedReference with one terminal classification)
//! ```

pub mod error;
pub mod parsed;
pub mod resolver;
pub mod resource_types;

pub use error::ParseError;
pub use parsed::{Operation, OperationScope, ParsedReference, ReferenceKind, Urn, UrnKind};
pub use resolver::ReferenceResolver;
pub use resource_types::{canonical_resource_type, is_container_capable, is_known_resource_type};
