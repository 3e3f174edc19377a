//! Error taxonomy shared by every subsystem.

use thiserror::Error;

use crate::reference::ParseError;

/// Result type for navigator operations.
pub type NavigatorResult<T> = Result<T, NavigatorError>;

/// Errors raised by the navigator and its collaborators.
#[derive(Debug, Error)]
pub enum NavigatorError {
    /// Blank repository code, unknown repository, missing base address.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed resource reference.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Target of a request does not exist (404/410).
    ///
    /// Point reads convert this into `Ok(None)`.
    #[error("{method} {path} found no resource")]
    NotFound { method: String, path: String },

    /// Connection, timeout or other transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Missing credentials or a failed token refresh.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A contained reference could not be resolved against its parent.
    #[error("Contained reference error: {0}")]
    ContainedReference(String),

    /// The resolved resource type disagrees with the requested one.
    #[error("Resource type mismatch: expected {expected}, found {actual} (reference: {reference})")]
    TypeMismatch {
        expected: String,
        actual: String,
        reference: String,
    },

    /// A well-formed reference that cannot be fetched from this repository.
    #[error("Unresolvable reference: {0}")]
    UnresolvableReference(String),

    /// Bundle rejected before it was sent.
    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    /// Response or input body is not a usable resource.
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    /// Server answered with an unexpected status code.
    #[error("{method} {path} returned HTTP {status}")]
    UnexpectedStatus {
        method: String,
        path: String,
        status: u16,
    },

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,
}

impl NavigatorError {
    /// True for failures the retry stage may absorb.
    pub fn is_transient(&self) -> bool {
        matches!(self, NavigatorError::Transport(e) if e.is_transient())
    }
}

impl From<serde_json::Error> for NavigatorError {
    fn from(e: serde_json::Error) -> Self {
        NavigatorError::InvalidResource(e.to_string())
    }
}

/// Failures of the raw transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request did not complete in time.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Request was sent but failed in flight.
    #[error("Request failed: {0}")]
    Request(String),

    /// Request could not be built or response could not be read.
    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Timeouts, connection failures and in-flight failures are transient.
    pub fn is_transient(&self) -> bool {
        !matches!(self, TransportError::Other(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_request() || e.is_body() {
            TransportError::Request(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}
