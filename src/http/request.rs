//! Outbound request representation.
//!
//! # Responsibilities
//! - Hold everything a stage may inspect or rewrite (method, URL, headers, body)
//! - Generate a unique request ID per logical call
//! - Stay cloneable so retry and auth stages can resend
//!
//! # Design Decisions
//! - Request ID added at construction, before any stage runs
//! - Body is buffered bytes; streaming bodies cannot be replayed

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use url::Url;
use uuid::Uuid;

use crate::error::{NavigatorError, NavigatorResult};

/// Header carrying the per-call correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Media type for FHIR JSON.
pub const FHIR_JSON: &str = "application/fhir+json";

/// A request travelling through the stage pipeline.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub request_id: Uuid,
}

impl HttpRequest {
    /// Create a request with a fresh request ID.
    pub fn new(method: Method, url: Url) -> Self {
        let request_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            headers.insert(HeaderName::from_static(X_REQUEST_ID), value);
        }
        Self {
            method,
            url,
            headers,
            body: None,
            request_id,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: Url) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Set (or replace) a header from a string value.
    pub fn set_header(&mut self, name: HeaderName, value: &str) -> NavigatorResult<()> {
        let value = HeaderValue::from_str(value).map_err(|e| {
            NavigatorError::Configuration(format!("invalid value for header {}: {}", name, e))
        })?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Builder form of [`set_header`](Self::set_header).
    pub fn with_header(mut self, name: HeaderName, value: &str) -> NavigatorResult<Self> {
        self.set_header(name, value)?;
        Ok(self)
    }

    /// Ask for FHIR JSON in the response.
    pub fn accept_fhir_json(mut self) -> Self {
        self.headers.insert(ACCEPT, HeaderValue::from_static(FHIR_JSON));
        self
    }

    /// Attach a FHIR JSON body.
    pub fn with_fhir_json(mut self, body: Vec<u8>) -> Self {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(FHIR_JSON));
        self.body = Some(body);
        self
    }

    /// Attach an `application/x-www-form-urlencoded` body.
    pub fn with_form<'a>(mut self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        self.body = Some(encoded.into_bytes());
        self
    }

    /// Header value as a string, if present and valid.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Path and query for logging, e.g. `/fhir/Patient/1`.
    pub fn path(&self) -> String {
        match self.url.query() {
            Some(q) => format!("{}?{}", self.url.path(), q),
            None => self.url.path().to_string(),
        }
    }
}
