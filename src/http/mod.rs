//! HTTP server subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, tracing)
//!     → GET /api/auth/csrf        → security::csrf issuance
//!     → GET /api/billing/status   → payments handle
//!     → /api/{*path}              → CSRF verification, then forwarded
//!                                   upstream via client::ApiClient
//! ```

pub mod server;

pub use server::HttpServer;
