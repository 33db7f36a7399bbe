/// Error type returned while configuring a client.
///
/// Request-time failures never surface here; they are classified into
/// [`crate::Outcome`] variants instead.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    /// The accumulated configuration cannot produce a working client.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The underlying `reqwest` client could not be constructed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// A required environment variable is missing or malformed.
    #[error("environment error: {0}")]
    Env(String),
}
