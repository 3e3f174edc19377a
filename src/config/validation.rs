//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check repository codes are present and unique
//! - Check credentials exist for every enabled auth mode
//! - Validate value ranges (delays ordered, proxy port set)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NavigatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use url::Url;

use crate::config::schema::{NavigatorConfig, ProxyConfig, RepositoryConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &NavigatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.repositories.is_empty() {
        errors.push(ValidationError::new("repositories", "at least one repository is required"));
    }

    let mut seen = HashSet::new();
    for (i, repo) in config.repositories.iter().enumerate() {
        let field = format!("repositories[{}]", i);
        if !repo.code.trim().is_empty() && !seen.insert(repo.code.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.code", field),
                format!("duplicate repository code '{}'", repo.code),
            ));
        }
        validate_repository(&field, repo, &mut errors);
    }

    if let Some(proxy) = &config.proxy {
        validate_proxy(proxy, &mut errors);
    }

    let retries = &config.retries;
    if retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if retries.seed_delay_ms > retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.seed_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_repository(field: &str, repo: &RepositoryConfig, errors: &mut Vec<ValidationError>) {
    if repo.code.trim().is_empty() {
        errors.push(ValidationError::new(format!("{}.code", field), "must not be blank"));
    }

    match Url::parse(&repo.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            format!("{}.base_url", field),
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            format!("{}.base_url", field),
            format!("invalid URL '{}': {}", repo.base_url, e),
        )),
    }

    if repo.use_oauth2 {
        if Url::parse(&repo.token_endpoint).is_err() {
            errors.push(ValidationError::new(
                format!("{}.token_endpoint", field),
                "a valid token endpoint is required when use_oauth2 is true",
            ));
        }
        if repo.client_id.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{}.client_id", field),
                "required when use_oauth2 is true",
            ));
        }
        if repo.client_secret.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{}.client_secret", field),
                "required when use_oauth2 is true",
            ));
        }
    }

    if repo.use_basic_auth {
        if repo.username.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{}.username", field),
                "required when use_basic_auth is true",
            ));
        }
        if repo.password.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{}.password", field),
                "required when use_basic_auth is true",
            ));
        }
    }
}

fn validate_proxy(proxy: &ProxyConfig, errors: &mut Vec<ValidationError>) {
    if !proxy.enabled {
        return;
    }
    if proxy.host.trim().is_empty() {
        errors.push(ValidationError::new("proxy.host", "required when the proxy is enabled"));
    }
    if proxy.port == 0 {
        errors.push(ValidationError::new("proxy.port", "must be greater than 0"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RepositoryConfig;

    fn valid_config() -> NavigatorConfig {
        let mut config = NavigatorConfig::default();
        config
            .repositories
            .push(RepositoryConfig::new("primary", "https://fhir.example.org/fhir"));
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.repositories.push(RepositoryConfig::new("primary", "ftp://nowhere"));
        let mut oauth = RepositoryConfig::new("secure", "https://secure/fhir");
        oauth.use_oauth2 = true;
        config.repositories.push(oauth);

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"repositories[1].code"));
        assert!(fields.contains(&"repositories[1].base_url"));
        assert!(fields.contains(&"repositories[2].token_endpoint"));
        assert!(fields.contains(&"repositories[2].client_id"));
        assert!(fields.contains(&"repositories[2].client_secret"));
    }

    #[test]
    fn test_basic_auth_requires_credentials() {
        let mut config = valid_config();
        config.repositories[0].use_basic_auth = true;
        config.repositories[0].username = "user".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "repositories[0].password");
    }

    #[test]
    fn test_empty_config_rejected() {
        let errors = validate_config(&NavigatorConfig::default()).unwrap_err();
        assert_eq!(errors[0].field, "repositories");
    }

    #[test]
    fn test_retry_delays_ordered() {
        let mut config = valid_config();
        config.retries.seed_delay_ms = 5_000;
        config.retries.max_delay_ms = 100;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "retries.seed_delay_ms");
    }
}
