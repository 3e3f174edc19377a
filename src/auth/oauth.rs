//! OAuth2 client-credentials token provider.
//!
//! # Responsibilities
//! - Post the client-credentials grant to a repository's token endpoint
//! - Turn the token response into a [`BearerToken`]
//!
//! # Design Decisions
//! - The grant goes through its own pipeline (retry only, never auth)
//! - Any non-success answer is an authentication error, never a stale token

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::auth::token::BearerToken;
use crate::config::RepositoryConfig;
use crate::error::{NavigatorError, NavigatorResult};
use crate::http::{HttpRequest, Pipeline};
use crate::observability::metrics;

/// Source of fresh bearer tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch(&self, repository: &RepositoryConfig) -> NavigatorResult<BearerToken>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
    token_type: Option<String>,
}

/// Client-credentials grant over the HTTP pipeline.
pub struct ClientCredentialsProvider {
    pipeline: Pipeline,
}

impl ClientCredentialsProvider {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    fn grant_request(repository: &RepositoryConfig) -> NavigatorResult<HttpRequest> {
        let endpoint = Url::parse(&repository.token_endpoint).map_err(|e| {
            NavigatorError::Configuration(format!(
                "invalid token endpoint '{}' for repository '{}': {}",
                repository.token_endpoint, repository.code, e
            ))
        })?;

        let mut form = vec![
            ("client_id", repository.client_id.as_str()),
            ("client_secret", repository.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];
        if !repository.scopes.trim().is_empty() {
            form.push(("scope", repository.scopes.trim()));
        }

        Ok(HttpRequest::post(endpoint).with_form(form))
    }

    async fn request_token(&self, repository: &RepositoryConfig) -> NavigatorResult<BearerToken> {
        let request = Self::grant_request(repository)?;
        let response = self.pipeline.send(request).await?;

        if !response.is_success() {
            return Err(NavigatorError::Auth(format!(
                "token endpoint for '{}' returned HTTP {}: {}",
                repository.code,
                response.status.as_u16(),
                response.text()
            )));
        }

        let body: TokenResponse = response.json().map_err(|e| {
            NavigatorError::Auth(format!("unreadable token response for '{}': {}", repository.code, e))
        })?;

        let value = body
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                NavigatorError::Auth(format!("token response for '{}' has no access_token", repository.code))
            })?;
        let scheme = body
            .token_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Bearer".to_string());

        Ok(BearerToken::new(value, scheme, body.expires_in))
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn fetch(&self, repository: &RepositoryConfig) -> NavigatorResult<BearerToken> {
        tracing::info!(
            repository = %repository.code,
            display_name = %repository.display_name,
            "Requesting new API token"
        );

        let result = self.request_token(repository).await;
        metrics::record_token_refresh(&repository.code, result.is_ok());

        match &result {
            Ok(token) => tracing::info!(
                repository = %repository.code,
                expires_in_secs = token.expires_in_secs,
                "Obtained new API token"
            ),
            Err(e) => tracing::error!(
                repository = %repository.code,
                display_name = %repository.display_name,
                error = %e,
                "Error obtaining new API token"
            ),
        }
        result
    }
}
