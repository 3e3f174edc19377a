//! `reqwest`-backed transport.
//!
//! # Responsibilities
//! - Build the shared HTTP client (timeouts, outbound proxy)
//! - Execute a pipeline request and buffer the response
//! - Record per-request metrics
//!
//! # Design Decisions
//! - One client per process, cloned into every transport (connection pooling)
//! - Classification of failures (transient or not) happens in `TransportError`

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::config::{NavigatorConfig, ProxyConfig};
use crate::error::{NavigatorError, NavigatorResult, TransportError};
use crate::http::pipeline::Transport;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::observability::metrics;

/// Build the shared HTTP client from configuration.
pub fn build_http_client(config: &NavigatorConfig) -> NavigatorResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
        .timeout(Duration::from_secs(config.timeouts.request_secs));

    match &config.proxy {
        Some(proxy) if proxy.enabled => {
            builder = builder.proxy(build_proxy(proxy)?);
        }
        _ => {}
    }

    builder
        .build()
        .map_err(|e| NavigatorError::Configuration(format!("failed to build HTTP client: {}", e)))
}

fn build_proxy(proxy: &ProxyConfig) -> NavigatorResult<reqwest::Proxy> {
    let address = format!("{}:{}", proxy.host.trim_end_matches('/'), proxy.port);
    let mut reqwest_proxy = reqwest::Proxy::all(&address).map_err(|e| {
        NavigatorError::Configuration(format!(
            "proxy host and port do not combine to a valid URI '{}': {}",
            address, e
        ))
    })?;

    if !proxy.username.trim().is_empty() && !proxy.password.trim().is_empty() {
        let username = if proxy.domain.trim().is_empty() {
            proxy.username.clone()
        } else {
            format!("{}\\{}", proxy.domain.trim(), proxy.username)
        };
        reqwest_proxy = reqwest_proxy.basic_auth(&username, &proxy.password);
    }

    tracing::info!(proxy = %address, "Outbound proxy configured");
    Ok(reqwest_proxy)
}

/// Transport that sends requests with a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    repository: String,
}

impl ReqwestTransport {
    /// `repository` labels logs and metrics.
    pub fn new(client: reqwest::Client, repository: impl Into<String>) -> Self {
        Self {
            client,
            repository: repository.into(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let start = Instant::now();
        let method = request.method.clone();
        tracing::trace!(
            repository = %self.repository,
            request_id = %request.request_id,
            method = %method,
            path = %request.path(),
            "Sending request"
        );

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        metrics::record_request(&self.repository, method.as_str(), status.as_u16(), start);

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
