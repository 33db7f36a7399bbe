//! Linear retry policy applied before an attempt is classified.

use std::time::Duration;

use reqwest::StatusCode;

/// Header carrying the retry number on every resent request.
pub const RETRY_COUNT_HEADER: &str = "x-retry-count";

/// Resend policy for failed attempts.
///
/// A failed attempt is a non-2xx response or a transport error. The Nth retry
/// waits `N * delay_unit` before being sent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Retries are only performed when set.
    pub enabled: bool,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Linear backoff step.
    pub delay_unit: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A policy allowing `max_retries` retries with one-second steps.
    pub fn linear(max_retries: u32) -> Self {
        Self {
            enabled: true,
            max_retries,
            ..Self::default()
        }
    }

    /// Number of retries actually available.
    pub fn budget(&self) -> u32 {
        if self.enabled {
            self.max_retries
        } else {
            0
        }
    }

    /// Whether another attempt may follow `retries_done` retries.
    pub fn allows(&self, retries_done: u32) -> bool {
        retries_done < self.budget()
    }

    /// Wait before the given retry (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.delay_unit.saturating_mul(retry)
    }

    pub(crate) fn should_retry_status(&self, status: StatusCode) -> bool {
        !status.is_success()
    }

    pub(crate) fn should_retry_transport(&self, err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
            delay_unit: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode;

    use super::RetryPolicy;

    #[test]
    fn disabled_policy_ignores_count() {
        let policy = RetryPolicy {
            enabled: false,
            max_retries: 5,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.budget(), 0);
        assert!(!policy.allows(0));
    }

    #[test]
    fn linear_backoff_waits_one_two_three_seconds() {
        let policy = RetryPolicy::linear(3);
        let delays: Vec<_> = (1..=3).map(|retry| policy.delay_for(retry)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3)
            ]
        );
    }

    #[test]
    fn budget_of_three_allows_three_retries() {
        let policy = RetryPolicy::linear(3);
        let attempts = 1 + (0..).take_while(|done| policy.allows(*done)).count();
        assert_eq!(attempts, 4);
    }

    #[test]
    fn every_non_success_status_is_retryable() {
        let policy = RetryPolicy::linear(1);
        assert!(policy.should_retry_status(StatusCode::NOT_FOUND));
        assert!(policy.should_retry_status(StatusCode::BAD_GATEWAY));
        assert!(policy.should_retry_status(StatusCode::FOUND));
        assert!(!policy.should_retry_status(StatusCode::CREATED));
    }
}
