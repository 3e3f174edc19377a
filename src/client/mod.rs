//! Resource client subsystem.
//!
//! # Data Flow
//! ```text
//! Navigator / search accumulator
//!     → ResourceClient trait (get, search, continue, create, update, delete, transaction)
//!     → rest.rs (build FHIR REST request, map status codes)
//!     → http::Pipeline (auth → retry → transport)
//! ```

pub mod rest;

use async_trait::async_trait;

use crate::error::NavigatorResult;
use crate::model::{Bundle, Resource, SearchParams};

pub use rest::RestResourceClient;

/// Operations against one repository.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Repository code, used for logging.
    fn repository(&self) -> &str;

    /// Read one resource. `None` when the server reports it not found or gone.
    async fn get_by_id(&self, resource_type: &str, id: &str) -> NavigatorResult<Option<Resource>>;

    /// First page of a search. `None` when the server returns no bundle.
    async fn search(&self, resource_type: &str, params: &SearchParams) -> NavigatorResult<Option<Bundle>>;

    /// Page after `previous`. `None` when `previous` has no `next` link.
    async fn continue_page(&self, previous: &Bundle) -> NavigatorResult<Option<Bundle>>;

    async fn create(&self, resource: &Resource) -> NavigatorResult<Resource>;

    /// Replace a resource. With `version_aware` the update is conditional on its current version.
    async fn update(&self, resource: &Resource, version_aware: bool) -> NavigatorResult<Resource>;

    async fn delete(&self, resource_type: &str, id: &str) -> NavigatorResult<()>;

    async fn submit_transaction(&self, bundle: &Bundle) -> NavigatorResult<Bundle>;
}
