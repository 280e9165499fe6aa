//! Backoff delay computation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the inter-attempt delay grows with the attempt number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// `base * attempt`
    Linear,
    /// `base * 2^(attempt - 1)`
    #[default]
    Exponential,
}

/// Delay to wait after failed attempt number `attempt` (1-based).
///
/// Saturates instead of overflowing for large attempt numbers.
/// No jitter is applied.
pub fn delay_for_attempt(kind: BackoffKind, base_ms: u64, attempt: u32) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let delay_ms = match kind {
        BackoffKind::Linear => base_ms.saturating_mul(attempt as u64),
        BackoffKind::Exponential => {
            let factor = 2u64.saturating_pow(attempt - 1);
            base_ms.saturating_mul(factor)
        }
    };

    Duration::from_millis(delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_doubles_per_attempt() {
        assert_eq!(delay_for_attempt(BackoffKind::Exponential, 100, 1).as_millis(), 100);
        assert_eq!(delay_for_attempt(BackoffKind::Exponential, 100, 2).as_millis(), 200);
        assert_eq!(delay_for_attempt(BackoffKind::Exponential, 100, 3).as_millis(), 400);
        assert_eq!(delay_for_attempt(BackoffKind::Exponential, 100, 4).as_millis(), 800);
    }

    #[test]
    fn linear_grows_with_attempt() {
        assert_eq!(delay_for_attempt(BackoffKind::Linear, 250, 1).as_millis(), 250);
        assert_eq!(delay_for_attempt(BackoffKind::Linear, 250, 2).as_millis(), 500);
        assert_eq!(delay_for_attempt(BackoffKind::Linear, 250, 3).as_millis(), 750);
    }

    #[test]
    fn attempt_zero_has_no_delay() {
        assert_eq!(delay_for_attempt(BackoffKind::Exponential, 100, 0), Duration::ZERO);
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let d = delay_for_attempt(BackoffKind::Exponential, u64::MAX / 2, 80);
        assert_eq!(d.as_millis(), u64::MAX as u128);
    }
}
