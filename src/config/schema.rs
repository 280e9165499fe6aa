//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::resilience::RetryPolicy;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Upstream compliance API the gateway forwards to.
    pub upstream: UpstreamConfig,

    /// CSRF protection settings.
    pub security: SecurityConfig,

    /// Retry policy applied to outbound requests.
    pub retries: RetryPolicy,

    /// Session store seeding.
    pub session: SessionConfig,

    /// Payment provider integration.
    pub payments: PaymentConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Upstream backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the compliance API (e.g., "http://127.0.0.1:9000").
    pub base_url: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// CSRF protection settings.
///
/// The secret is the only field without a usable default: validation
/// rejects configs that leave it empty or shorter than 32 bytes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Server-side secret mixed into token hashes.
    pub secret: String,

    /// Name of the http-only cookie carrying the token hash.
    pub csrf_cookie_name: String,

    /// Name of the request header carrying the raw token.
    pub csrf_header_name: String,

    /// Cookie lifetime in seconds.
    pub csrf_token_ttl_secs: u64,

    /// Mark the cookie `Secure`. Disable only for local development.
    pub secure_cookies: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            csrf_cookie_name: "csrf-token-hash".to_string(),
            csrf_header_name: "x-csrf-token".to_string(),
            csrf_token_ttl_secs: 3600,
            secure_cookies: true,
        }
    }
}

/// Session store seeding.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Service auth token attached to upstream requests when the incoming
    /// request carries no Authorization header of its own.
    pub auth_token: Option<String>,
}

/// Payment provider integration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PaymentConfig {
    /// Enable billing status lookups.
    pub enabled: bool,

    /// Base URL of the payment provider API.
    pub provider_url: String,

    /// API key presented to the provider.
    pub api_key: String,

    /// Provider-side account identifier for this deployment.
    pub account: String,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default tracing filter; `RUST_LOG` overrides it.
    pub log_filter: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "edge_gateway=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
