//! Outbound HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway handler:
//!     → api.rs builds the upstream request (auth token from the session
//!       store, hop-by-hop headers stripped)
//!     → resilience::retry re-executes transient failures
//!     → final response or error surfaced unchanged
//! ```

pub mod api;

pub use api::{ApiClient, ApiError};
