use std::time::Duration;

use crate::RetryPolicy;

/// Default budget for each of the three timeouts, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;

/// Request, connect and socket timeouts in milliseconds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timeouts {
    /// Whole-request budget, from dispatch until the body is read.
    pub request_ms: u64,
    /// Budget for establishing the connection.
    pub connect_ms: u64,
    /// Budget for each individual socket read.
    pub socket_ms: u64,
}

impl Timeouts {
    pub(crate) fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub(crate) fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub(crate) fn socket(&self) -> Duration {
        Duration::from_millis(self.socket_ms)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_ms: DEFAULT_TIMEOUT_MS,
            connect_ms: DEFAULT_TIMEOUT_MS,
            socket_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// How HTTP 5xx responses are classified.
///
/// The default keeps the long-standing behavior of reporting server errors as
/// an expired session. Switch to [`ServerErrorPolicy::Error`] to report them
/// as plain errors instead.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ServerErrorPolicy {
    /// 5xx becomes [`crate::Outcome::SessionExpired`].
    #[default]
    SessionExpired,
    /// 5xx becomes [`crate::Outcome::Error`].
    Error,
}

/// Configures HTTP timeout, retry and classification behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Timeout triple handed to the transport.
    pub timeouts: Timeouts,
    /// Resend policy for failed attempts.
    pub retry: RetryPolicy,
    /// Whether 3xx responses are followed by the transport.
    pub follow_redirects: bool,
    /// Classification of 5xx responses.
    pub server_errors: ServerErrorPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeouts: Timeouts::default(),
            retry: RetryPolicy::default(),
            follow_redirects: true,
            server_errors: ServerErrorPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ClientOptions, ServerErrorPolicy, Timeouts};

    #[test]
    fn timeouts_default_to_three_seconds() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.request(), Duration::from_secs(3));
        assert_eq!(timeouts.connect(), Duration::from_secs(3));
        assert_eq!(timeouts.socket(), Duration::from_secs(3));
    }

    #[test]
    fn defaults_follow_redirects_and_keep_session_expired_policy() {
        let options = ClientOptions::default();
        assert!(options.follow_redirects);
        assert!(!options.retry.enabled);
        assert_eq!(options.retry.max_retries, 0);
        assert_eq!(options.server_errors, ServerErrorPolicy::SessionExpired);
    }
}
