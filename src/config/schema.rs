//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the navigator.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration: every upstream repository plus shared settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Upstream FHIR repositories, keyed by their code.
    pub repositories: Vec<RepositoryConfig>,

    /// Optional outbound proxy used for every request.
    pub proxy: Option<ProxyConfig>,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl NavigatorConfig {
    /// Look up a repository by its code (exact match).
    pub fn repository(&self, code: &str) -> Option<&RepositoryConfig> {
        self.repositories.iter().find(|r| r.code == code)
    }
}

/// One upstream repository.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    /// Unique internal code for this repository.
    pub code: String,

    /// Human friendly display name.
    #[serde(default)]
    pub display_name: String,

    /// Service base URL, e.g. `https://fhir.example.org/fhir`.
    pub base_url: String,

    /// Use the OAuth2 client credentials flow.
    #[serde(default)]
    pub use_oauth2: bool,

    /// OAuth2 token endpoint.
    #[serde(default)]
    pub token_endpoint: String,

    /// OAuth2 client id.
    #[serde(default)]
    pub client_id: String,

    /// OAuth2 client secret.
    #[serde(default)]
    pub client_secret: String,

    /// OAuth2 scopes, space separated. Omitted from the grant when blank.
    #[serde(default)]
    pub scopes: String,

    /// Use Basic auth with `username` and `password`.
    #[serde(default)]
    pub use_basic_auth: bool,

    /// Basic auth username.
    #[serde(default)]
    pub username: String,

    /// Basic auth password.
    #[serde(default)]
    pub password: String,

    /// Sent as the `x-api-key` header when not blank.
    #[serde(default)]
    pub api_key: String,
}

impl RepositoryConfig {
    /// Minimal configuration with no authentication.
    pub fn new(code: impl Into<String>, base_url: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            display_name: code.clone(),
            code,
            base_url: base_url.into(),
            use_oauth2: false,
            token_endpoint: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            scopes: String::new(),
            use_basic_auth: false,
            username: String::new(),
            password: String::new(),
            api_key: String::new(),
        }
    }

    /// The API key, if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}

/// Outbound proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Route requests through the proxy.
    #[serde(default)]
    pub enabled: bool,

    /// Proxy host including scheme, e.g. `http://proxy.local`.
    pub host: String,

    /// Proxy port.
    pub port: u16,

    /// Proxy username.
    #[serde(default)]
    pub username: String,

    /// Proxy password.
    #[serde(default)]
    pub password: String,

    /// Network domain of the proxy user.
    #[serde(default)]
    pub domain: String,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts per call, including the first (capped at 10).
    pub max_attempts: u32,

    /// Smallest jittered delay in milliseconds.
    pub seed_delay_ms: u64,

    /// Largest jittered delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            seed_delay_ms: 200,
            max_delay_ms: 120_000,
        }
    }
}

/// Timeout configuration for outbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 100,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
