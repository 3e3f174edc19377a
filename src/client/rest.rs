//! FHIR REST client over the request pipeline.
//!
//! # Responsibilities
//! - Map resource operations onto FHIR REST interactions
//! - Distinguish not-found from other failures
//! - Log failures with method and path
//!
//! # Design Decisions
//! - 404 and 410 are "absent" for reads; every other non-success raises
//! - Continuation follows the server's `next` link verbatim
//! - Paths are logged relative to `[base]`

use async_trait::async_trait;
use reqwest::header::{HeaderName, IF_MATCH, LOCATION};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::client::ResourceClient;
use crate::error::{NavigatorError, NavigatorResult};
use crate::http::{HttpRequest, HttpResponse, Pipeline};
use crate::model::{Bundle, BundleType, Resource, SearchParams};

/// `Prefer` header asking the server to return the stored resource.
const PREFER: &str = "prefer";

/// REST implementation of [`ResourceClient`].
#[derive(Clone)]
pub struct RestResourceClient {
    repository: String,
    base_url: Url,
    pipeline: Pipeline,
}

impl RestResourceClient {
    pub fn new(repository: impl Into<String>, base_url: &str, pipeline: Pipeline) -> NavigatorResult<Self> {
        let repository = repository.into();
        let mut base_url = Url::parse(base_url).map_err(|e| {
            NavigatorError::Configuration(format!(
                "repository '{}' has an invalid base URL '{}': {}",
                repository, base_url, e
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(NavigatorError::Configuration(format!(
                "repository '{}' base URL '{}' cannot be a base",
                repository, base_url
            )));
        }
        base_url.set_query(None);
        base_url.set_fragment(None);
        Ok(Self {
            repository,
            base_url,
            pipeline,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `[base]/seg1/seg2...`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: HttpRequest, log_path: &str) -> NavigatorResult<HttpResponse> {
        let method = request.method.clone();
        self.pipeline.send(request).await.inspect_err(|e| {
            tracing::error!(
                repository = %self.repository,
                method = %method,
                path = %log_path,
                error = %e,
                "Request to FHIR endpoint failed"
            );
        })
    }

    fn unexpected(&self, method: &Method, log_path: &str, response: &HttpResponse) -> NavigatorError {
        tracing::error!(
            repository = %self.repository,
            method = %method,
            path = %log_path,
            status = %response.status,
            body = %truncate(&response.text(), 512),
            "Unexpected status from FHIR endpoint"
        );
        NavigatorError::UnexpectedStatus {
            method: method.to_string(),
            path: log_path.to_string(),
            status: response.status.as_u16(),
        }
    }

    fn read_bundle(&self, response: &HttpResponse, log_path: &str) -> NavigatorResult<Option<Bundle>> {
        if response.status == StatusCode::NO_CONTENT || response.body.is_empty() {
            return Ok(None);
        }
        Bundle::from_slice(&response.body).map(Some).inspect_err(|e| {
            tracing::error!(repository = %self.repository, path = %log_path, error = %e, "Unreadable bundle");
        })
    }

    async fn get_bundle(&self, url: Url, log_path: &str) -> NavigatorResult<Option<Bundle>> {
        tracing::debug!(repository = %self.repository, query = %log_path, "FHIR search query");
        let request = HttpRequest::get(url).accept_fhir_json();
        let response = self.send(request, log_path).await?;
        match response.status {
            s if s.is_success() => self.read_bundle(&response, log_path),
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(None),
            _ => Err(self.unexpected(&Method::GET, log_path, &response)),
        }
    }

    /// Body of a create/update response, or `fallback` when the server sent none.
    fn returned_resource(&self, response: &HttpResponse, fallback: &Resource) -> NavigatorResult<Resource> {
        if response.body.is_empty() {
            let mut resource = fallback.clone();
            if let Some(id) = response
                .headers
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(id_from_location)
            {
                resource.set_id(id);
            }
            return Ok(resource);
        }
        Resource::from_slice(&response.body)
    }
}

#[async_trait]
impl ResourceClient for RestResourceClient {
    fn repository(&self) -> &str {
        &self.repository
    }

    async fn get_by_id(&self, resource_type: &str, id: &str) -> NavigatorResult<Option<Resource>> {
        let log_path = format!("[base]/{}/{}", resource_type, id);
        let request = HttpRequest::get(self.url(&[resource_type, id])).accept_fhir_json();
        let response = self.send(request, &log_path).await?;

        match response.status {
            s if s.is_success() => Ok(Some(Resource::from_slice(&response.body)?)),
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                tracing::debug!(repository = %self.repository, path = %log_path, "Resource not found");
                Ok(None)
            }
            _ => Err(self.unexpected(&Method::GET, &log_path, &response)),
        }
    }

    async fn search(&self, resource_type: &str, params: &SearchParams) -> NavigatorResult<Option<Bundle>> {
        let mut url = self.url(&[resource_type]);
        let query = params.to_query_string();
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
        let log_path = format!("GET [base]/{}?{}", resource_type, query);
        self.get_bundle(url, &log_path).await
    }

    async fn continue_page(&self, previous: &Bundle) -> NavigatorResult<Option<Bundle>> {
        let Some(next) = previous.next_link() else {
            return Ok(None);
        };
        let url = Url::parse(next)
            .or_else(|_| self.base_url.join(next))
            .map_err(|e| NavigatorError::InvalidBundle(format!("unusable next link '{}': {}", next, e)))?;
        let log_path = format!("GET {}", next);
        self.get_bundle(url, &log_path).await
    }

    async fn create(&self, resource: &Resource) -> NavigatorResult<Resource> {
        let resource_type = resource.resource_type();
        let log_path = format!("[base]/{}", resource_type);
        let request = HttpRequest::post(self.url(&[resource_type]))
            .accept_fhir_json()
            .with_fhir_json(resource.to_bytes()?)
            .with_header(HeaderName::from_static(PREFER), "return=representation")?;

        let response = self.send(request, &log_path).await?;
        if !response.is_success() {
            return Err(self.unexpected(&Method::POST, &log_path, &response));
        }
        tracing::debug!(repository = %self.repository, path = %log_path, "Resource created");
        self.returned_resource(&response, resource)
    }

    async fn update(&self, resource: &Resource, version_aware: bool) -> NavigatorResult<Resource> {
        let resource_type = resource.resource_type();
        let id = resource.id().ok_or_else(|| {
            NavigatorError::InvalidResource(format!("cannot update a {} without an id", resource_type))
        })?;
        let log_path = format!("[base]/{}/{}", resource_type, id);

        let mut request = HttpRequest::put(self.url(&[resource_type, id]))
            .accept_fhir_json()
            .with_fhir_json(resource.to_bytes()?)
            .with_header(HeaderName::from_static(PREFER), "return=representation")?;
        if version_aware {
            if let Some(version) = resource.version_id() {
                request.set_header(IF_MATCH, &format!("W/\"{}\"", version))?;
            }
        }

        let response = self.send(request, &log_path).await?;
        if !response.is_success() {
            return Err(self.unexpected(&Method::PUT, &log_path, &response));
        }
        self.returned_resource(&response, resource)
    }

    async fn delete(&self, resource_type: &str, id: &str) -> NavigatorResult<()> {
        let log_path = format!("[base]/{}/{}", resource_type, id);
        let request = HttpRequest::delete(self.url(&[resource_type, id])).accept_fhir_json();
        let response = self.send(request, &log_path).await?;

        match response.status {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(NavigatorError::NotFound {
                method: Method::DELETE.to_string(),
                path: log_path,
            }),
            _ => Err(self.unexpected(&Method::DELETE, &log_path, &response)),
        }
    }

    async fn submit_transaction(&self, bundle: &Bundle) -> NavigatorResult<Bundle> {
        let log_path = "[base]".to_string();
        let request = HttpRequest::post(self.base_url.clone())
            .accept_fhir_json()
            .with_fhir_json(bundle.to_bytes()?);

        let response = self.send(request, &log_path).await?;
        if !response.is_success() {
            return Err(self.unexpected(&Method::POST, &log_path, &response));
        }
        match self.read_bundle(&response, &log_path)? {
            Some(result) => Ok(result),
            None => Ok(Bundle::new(BundleType::TransactionResponse)),
        }
    }
}

/// `123` from `http://x/fhir/Patient/123/_history/1` or `Patient/123`.
fn id_from_location(location: &str) -> Option<String> {
    let path = location.split('?').next().unwrap_or(location);
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    let end = match segments.iter().rposition(|s| *s == "_history") {
        Some(i) => i,
        None => segments.len(),
    };
    segments[..end]
        .last()
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}
