//! Resource model.
//!
//! Resources are opaque JSON objects tagged with their type. Typed wrappers
//! give compile-time intent for reads without a generated schema.

pub mod bundle;
pub mod resource;
pub mod search_params;

pub use bundle::{Bundle, BundleEntry, BundleLink, BundleType};
pub use resource::{
    CapabilityStatement, Condition, DiagnosticReport, Encounter, Group, Location, Medication,
    Observation, OperationOutcome, Organization, Patient, Practitioner, PractitionerRole, Resource,
    ServiceRequest, Specimen, Task, TypedResource,
};
pub use search_params::SearchParams;
