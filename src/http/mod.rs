//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Resource Client call
//!     → request.rs (build request, add request ID)
//!     → pipeline.rs (auth stage → retry stage → ...)
//!     → transport.rs (reqwest client, proxy, timeouts)
//!     → response.rs (buffered status, headers, body)
//! ```

pub mod pipeline;
pub mod request;
pub mod response;
pub mod transport;

pub use pipeline::{Next, Pipeline, Stage, Transport};
pub use request::{HttpRequest, FHIR_JSON, X_REQUEST_ID};
pub use response::HttpResponse;
pub use transport::{build_http_client, ReqwestTransport};
