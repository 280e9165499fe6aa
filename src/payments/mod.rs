//! Payment provider integration.
//!
//! The provider handle is constructed once at startup and passed to the
//! router state explicitly. There is no lazy global client: a disabled
//! config simply yields no handle and the billing route answers 503.

pub mod client;

pub use client::{BillingStatus, PaymentClient};
