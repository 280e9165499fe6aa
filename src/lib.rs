//! Security and resilience edge for the compliance dashboard.
//!
//! Sits between the browser client and the upstream compliance API:
//! issues and verifies CSRF double-submit tokens on state-changing
//! requests, and forwards `/api` traffic upstream through an outbound
//! client with bounded, backoff-shaped retries.

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod payments;
pub mod resilience;
pub mod security;
pub mod session;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
