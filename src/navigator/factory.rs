//! Wiring of navigators from configuration.

use std::sync::Arc;

use crate::auth::{AuthenticationStage, ClientCredentialsProvider, TokenStore};
use crate::client::RestResourceClient;
use crate::config::validation::validate_config;
use crate::config::NavigatorConfig;
use crate::error::{NavigatorError, NavigatorResult};
use crate::http::{build_http_client, Pipeline, ReqwestTransport};
use crate::lifecycle::Cancellation;
use crate::navigator::Navigator;
use crate::reference::ReferenceResolver;
use crate::resilience::{DecorrelatedJitter, Jitter, RetryPolicy, RetryStage};

/// Builds a [`Navigator`] per repository over shared process-wide parts.
///
/// The HTTP client, token store, jitter source and reference resolver are
/// created once and shared by every navigator. Each navigator gets its own
/// child of the root cancellation signal.
pub struct NavigatorFactory {
    config: Arc<NavigatorConfig>,
    http: reqwest::Client,
    tokens: Arc<TokenStore>,
    jitter: Arc<dyn Jitter>,
    cancel: Cancellation,
    resolver: Arc<ReferenceResolver>,
}

impl NavigatorFactory {
    pub fn new(config: Arc<NavigatorConfig>) -> NavigatorResult<Self> {
        validate_config(&config).map_err(|errors| {
            let joined = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
            NavigatorError::Configuration(joined)
        })?;

        let http = build_http_client(&config)?;
        let resolver = Arc::new(ReferenceResolver::new(&config)?);

        tracing::info!(repositories = config.repositories.len(), "Navigator factory ready");

        Ok(Self {
            config,
            http,
            tokens: Arc::new(TokenStore::new()),
            jitter: Arc::new(DecorrelatedJitter),
            cancel: Cancellation::new(),
            resolver,
        })
    }

    /// A fresh navigator, with an empty cache, for repository `code`.
    pub fn navigator(&self, code: &str) -> NavigatorResult<Navigator> {
        let code = code.trim();
        if code.is_empty() {
            return Err(NavigatorError::Configuration(
                "a repository code is required".to_string(),
            ));
        }
        let repository = self.config.repository(code).ok_or_else(|| {
            NavigatorError::Configuration(format!("no repository is configured with code '{}'", code))
        })?;
        let repository = Arc::new(repository.clone());

        let cancel = self.cancel.child();
        let policy = RetryPolicy::from(&self.config.retries);
        let transport = Arc::new(ReqwestTransport::new(self.http.clone(), code));

        let token_pipeline =
            Pipeline::new(transport.clone()).with_stage(self.retry_stage(policy.clone(), &cancel, code));
        let provider = Arc::new(ClientCredentialsProvider::new(token_pipeline));

        let pipeline = Pipeline::new(transport)
            .with_stage(Arc::new(AuthenticationStage::new(
                repository.clone(),
                self.tokens.clone(),
                provider,
            )))
            .with_stage(self.retry_stage(policy, &cancel, code));

        let client = RestResourceClient::new(code, &repository.base_url, pipeline)?;
        tracing::debug!(repository = code, base_url = %repository.base_url, "Navigator created");

        Ok(Navigator::new(code, Arc::new(client), self.resolver.clone()).with_cancellation(cancel))
    }

    fn retry_stage(&self, policy: RetryPolicy, cancel: &Cancellation, code: &str) -> Arc<RetryStage> {
        Arc::new(RetryStage::new(policy, self.jitter.clone(), cancel.clone(), code))
    }

    /// Root signal. Every navigator observes a child of it, so cancelling the
    /// root stops all of them.
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancel
    }

    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn resolver(&self) -> &Arc<ReferenceResolver> {
        &self.resolver
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }
}
