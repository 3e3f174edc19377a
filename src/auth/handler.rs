//! Authentication stage.
//!
//! # Responsibilities
//! - Attach OAuth2, Basic and API key credentials to every request
//! - Refresh tokens that are absent or about to expire, before sending
//! - Refresh once and resend once when the server answers 401/403
//!
//! # Design Decisions
//! - Basic credentials override a bearer header when both modes are enabled
//! - The API key header is independent of the other modes
//! - A failed refresh fails the call; a stale token is never sent

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderName, AUTHORIZATION};
use reqwest::StatusCode;

use crate::auth::oauth::TokenProvider;
use crate::auth::store::TokenStore;
use crate::auth::token::{BearerToken, DEFAULT_REFRESH_THRESHOLD};
use crate::config::RepositoryConfig;
use crate::error::{NavigatorError, NavigatorResult};
use crate::http::{HttpRequest, HttpResponse, Next, Stage};

/// Header carrying the repository API key.
pub const X_API_KEY: &str = "x-api-key";

/// Pipeline stage that authenticates requests for one repository.
pub struct AuthenticationStage {
    repository: Arc<RepositoryConfig>,
    store: Arc<TokenStore>,
    provider: Arc<dyn TokenProvider>,
}

impl AuthenticationStage {
    pub fn new(
        repository: Arc<RepositoryConfig>,
        store: Arc<TokenStore>,
        provider: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            repository,
            store,
            provider,
        }
    }

    /// Fetch a fresh token and store it.
    async fn refresh(&self) -> NavigatorResult<BearerToken> {
        let token = self.provider.fetch(&self.repository).await?;
        self.store.add_or_replace(&self.repository.code, token.clone());
        Ok(token)
    }

    /// Cached token, refreshed if absent or expiring soon.
    async fn current_token(&self) -> NavigatorResult<BearerToken> {
        match self.store.get(&self.repository.code) {
            Some(token) if !token.expires_within(DEFAULT_REFRESH_THRESHOLD) => Ok(token),
            _ => self.refresh().await,
        }
    }

    fn basic_credentials(&self) -> NavigatorResult<String> {
        let repo = &self.repository;
        if repo.username.trim().is_empty() {
            return Err(NavigatorError::Auth(
                "when use_basic_auth is true a username must be provided".into(),
            ));
        }
        if repo.password.trim().is_empty() {
            return Err(NavigatorError::Auth(
                "when use_basic_auth is true a password must be provided".into(),
            ));
        }
        let encoded = STANDARD.encode(format!("{}:{}", repo.username, repo.password));
        Ok(format!("Basic {}", encoded))
    }
}

#[async_trait]
impl Stage for AuthenticationStage {
    async fn handle(&self, mut request: HttpRequest, next: Next<'_>) -> NavigatorResult<HttpResponse> {
        let repo = &self.repository;

        if repo.use_oauth2 {
            let token = self.current_token().await?;
            request.set_header(AUTHORIZATION, &token.header_value())?;
        }

        if repo.use_basic_auth {
            request.set_header(AUTHORIZATION, &self.basic_credentials()?)?;
        }

        if let Some(key) = repo.api_key() {
            request.set_header(HeaderName::from_static(X_API_KEY), key)?;
        }

        if !repo.use_oauth2 {
            return next.run(request).await;
        }

        let response = next.run(request.clone()).await?;
        if response.status != StatusCode::UNAUTHORIZED && response.status != StatusCode::FORBIDDEN {
            return Ok(response);
        }

        tracing::info!(
            repository = %repo.code,
            request_id = %request.request_id,
            status = %response.status,
            "Request rejected, refreshing token and resending once"
        );
        let token = self.refresh().await?;
        request.set_header(AUTHORIZATION, &token.header_value())?;
        next.run(request).await
    }
}
