//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Browser session start:
//!     → GET /api/auth/csrf issues a fresh token
//!     → hash stored in an http-only cookie, raw token returned as JSON
//!
//! State-changing request (POST/PUT/PATCH/DELETE):
//!     → csrf.rs middleware recomputes the hash of the header token
//!     → constant-time compare against the cookie value
//!     → mismatch or absence rejects the request before routing
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any verification failure
//! - Safe methods are never subject to verification
//! - No trust in client input

pub mod csrf;

pub use csrf::{csrf_middleware, issue_csrf_token, CsrfProtection, CsrfRejection};
