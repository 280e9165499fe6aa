//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request fails:
//!     → caller decides the failure is worth retrying
//!     → retry.rs (bounded sequential re-execution)
//!     → backoff.rs (delay between attempts, linear or exponential)
//! ```
//!
//! # Design Decisions
//! - The retry loop itself is unconditional; retryability is classified
//!   at the call site (network errors and 5xx yes, 4xx no)
//! - Attempts are strictly sequential, never concurrent
//! - The final failure is surfaced to the caller unchanged

pub mod backoff;
pub mod retry;

pub use backoff::{delay_for_attempt, BackoffKind};
pub use retry::{retry, RetryPolicy};
