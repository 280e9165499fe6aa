//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees syntactically.
//! Validation is a pure function and reports every problem it finds, not
//! just the first one.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(errors: &mut Vec<ValidationError>, field: &'static str, message: impl Into<String>) {
    errors.push(ValidationError {
        field,
        message: message.into(),
    });
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        err(
            &mut errors,
            "listener.bind_address",
            format!("not a valid socket address: {:?}", config.listener.bind_address),
        );
    }
    if config.listener.request_timeout_secs == 0 {
        err(&mut errors, "listener.request_timeout_secs", "must be greater than zero");
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => err(
            &mut errors,
            "upstream.base_url",
            format!("unsupported scheme {:?}", url.scheme()),
        ),
        Err(e) => err(&mut errors, "upstream.base_url", e.to_string()),
    }

    if config.retries.max_attempts == 0 {
        err(&mut errors, "retries.max_attempts", "must be at least 1");
    }

    if config.security.secret.len() < 32 {
        err(
            &mut errors,
            "security.secret",
            "must be set and at least 32 bytes long",
        );
    }
    if config.security.csrf_cookie_name.is_empty() {
        err(&mut errors, "security.csrf_cookie_name", "must not be empty");
    }
    if config.security.csrf_header_name.is_empty() {
        err(&mut errors, "security.csrf_header_name", "must not be empty");
    }
    if config.security.csrf_token_ttl_secs == 0 {
        err(&mut errors, "security.csrf_token_ttl_secs", "must be greater than zero");
    }

    if config.payments.enabled {
        if let Err(e) = Url::parse(&config.payments.provider_url) {
            err(&mut errors, "payments.provider_url", e.to_string());
        }
        if config.payments.api_key.is_empty() {
            err(&mut errors, "payments.api_key", "required when payments are enabled");
        }
        if config.payments.account.is_empty() {
            err(&mut errors, "payments.account", "required when payments are enabled");
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        err(
            &mut errors,
            "observability.metrics_address",
            format!(
                "not a valid socket address: {:?}",
                config.observability.metrics_address
            ),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
