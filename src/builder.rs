use std::{fmt, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION},
    redirect, Url,
};

use crate::{
    ClientOptions, HttpClient, HttpClientError, Interceptor, LogLevel, LogSink, LoggingPolicy,
    Result, ServerErrorPolicy, Timeouts,
};

/// Accumulated client configuration.
///
/// Only [`ClientBuilder`] mutates it; once a client is built it is shared
/// read-only between clones of that client.
#[derive(Clone, Default)]
pub struct ClientConfig {
    pub(crate) base_url: String,
    pub(crate) logging: LoggingPolicy,
    pub(crate) options: ClientOptions,
    pub(crate) interceptors: Vec<Interceptor>,
    pub(crate) default_headers: Vec<(String, String)>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .default_headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("logging", &self.logging)
            .field("options", &self.options)
            .field("interceptors", &self.interceptors.len())
            .field("default_headers", &headers)
            .finish()
    }
}

impl ClientConfig {
    /// Base endpoint relative paths are joined to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configured log verbosity.
    pub fn log_level(&self) -> LogLevel {
        self.logging.level
    }

    /// Timeouts, retry, redirect and 5xx settings.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Number of registered interceptors.
    pub fn interceptor_count(&self) -> usize {
        self.interceptors.len()
    }

    fn validate(&self) -> Result<()> {
        let timeouts = &self.options.timeouts;
        for (name, value) in [
            ("request", timeouts.request_ms),
            ("connect", timeouts.connect_ms),
            ("socket", timeouts.socket_ms),
        ] {
            if value == 0 {
                return Err(HttpClientError::InvalidConfig(format!(
                    "{name} timeout must be positive"
                )));
            }
        }
        if !self.base_url.is_empty() {
            Url::parse(&self.base_url).map_err(|err| {
                HttpClientError::InvalidConfig(format!(
                    "invalid base url '{}': {err}",
                    self.base_url
                ))
            })?;
        }
        Ok(())
    }

    fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(self.default_headers.len());
        for (name, value) in &self.default_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                HttpClientError::InvalidConfig(format!("invalid header name '{name}': {err}"))
            })?;
            let mut header_value = HeaderValue::from_str(value).map_err(|err| {
                HttpClientError::InvalidConfig(format!("invalid value for header '{name}': {err}"))
            })?;
            if header_name == AUTHORIZATION {
                header_value.set_sensitive(true);
            }
            headers.append(header_name, header_value);
        }
        Ok(headers)
    }

    fn transport(&self) -> Result<reqwest::Client> {
        let timeouts = &self.options.timeouts;
        let redirects = if self.options.follow_redirects {
            redirect::Policy::default()
        } else {
            redirect::Policy::none()
        };
        let client = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .read_timeout(timeouts.socket())
            .redirect(redirects)
            .default_headers(self.header_map()?)
            .build()?;
        Ok(client)
    }
}

/// Fluent builder for [`HttpClient`].
///
/// Every setter consumes and returns the builder; [`ClientBuilder::build`] is
/// the only terminal operation.
///
/// # Example
///
/// ```no_run
/// use outcome_http::{ClientBuilder, LogLevel};
///
/// let client = ClientBuilder::new()
///     .base_url("https://api.example.com/v1/")
///     .log_level(LogLevel::Info)
///     .request_timeout_ms(5_000)
///     .retry(true, 3)
///     .build()
///     .expect("valid configuration");
/// ```
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Starts from the defaults: 3000 ms timeouts, no retries, no logging.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from environment variables.
    ///
    /// Reads:
    /// - `OUTCOME_HTTP_BASE_URL` — base endpoint (required)
    /// - `OUTCOME_HTTP_TIMEOUT_MS` — applied to all three timeouts
    /// - `OUTCOME_HTTP_MAX_RETRIES` — enables retries when greater than zero
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("OUTCOME_HTTP_BASE_URL").map_err(|_| {
            HttpClientError::Env("missing OUTCOME_HTTP_BASE_URL environment variable".to_owned())
        })?;
        if base_url.trim().is_empty() {
            return Err(HttpClientError::Env(
                "OUTCOME_HTTP_BASE_URL is set but empty".to_owned(),
            ));
        }
        let mut builder = Self::new().base_url(base_url.trim());

        if let Some(timeout_ms) = parse_env::<u64>("OUTCOME_HTTP_TIMEOUT_MS")? {
            builder = builder.timeouts(Timeouts {
                request_ms: timeout_ms,
                connect_ms: timeout_ms,
                socket_ms: timeout_ms,
            });
        }
        if let Some(retries) = parse_env::<u32>("OUTCOME_HTTP_MAX_RETRIES")? {
            builder = builder.retry(retries > 0, retries);
        }
        Ok(builder)
    }

    /// Sets the endpoint relative paths are resolved against.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Sets how much of each exchange is logged (`LogLevel::None` by default).
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Routes log lines to `sink` instead of `tracing`.
    pub fn log_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let sink: LogSink = std::sync::Arc::new(sink);
        self.config.logging.sink = Some(sink);
        self
    }

    /// Appends an interceptor; interceptors run in the order they were added.
    pub fn interceptor(mut self, interceptor: Interceptor) -> Self {
        self.config.interceptors.push(interceptor);
        self
    }

    /// Bounds the whole exchange, from connect to the last body byte.
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.options.timeouts.request_ms = ms;
        self
    }

    /// Bounds connection establishment only.
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.options.timeouts.connect_ms = ms;
        self
    }

    /// Bounds each read from the socket.
    pub fn socket_timeout_ms(mut self, ms: u64) -> Self {
        self.config.options.timeouts.socket_ms = ms;
        self
    }

    /// Replaces all three timeouts at once.
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.config.options.timeouts = timeouts;
        self
    }

    /// Enables or disables retries; `count` is only used when enabled.
    pub fn retry(mut self, enabled: bool, count: u32) -> Self {
        self.config.options.retry.enabled = enabled;
        self.config.options.retry.max_retries = count;
        self
    }

    /// Sets the linear backoff step (one second by default).
    pub fn retry_delay_unit(mut self, unit: Duration) -> Self {
        self.config.options.retry.delay_unit = unit;
        self
    }

    /// Follows 3xx responses when `true` (the default); otherwise they resolve
    /// to an error outcome.
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.config.options.follow_redirects = follow;
        self
    }

    /// Chooses how 5xx responses are classified.
    pub fn server_error_policy(mut self, policy: ServerErrorPolicy) -> Self {
        self.config.options.server_errors = policy;
        self
    }

    /// Replaces timeouts, retry, redirect and 5xx settings at once.
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.config.options = options;
        self
    }

    /// Adds a header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .default_headers
            .push((name.into(), value.into()));
        self
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    ///
    /// If the token is missing the `Bearer ` prefix, it is added automatically.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        let authorization = normalize_bearer_authorization(token.as_ref());
        self.default_header(AUTHORIZATION.as_str(), authorization)
    }

    /// Validates the configuration and builds the client.
    pub fn build(self) -> Result<HttpClient> {
        self.config.validate()?;
        let transport = self.config.transport()?;
        tracing::debug!(
            base_url = %self.config.base_url,
            interceptors = self.config.interceptors.len(),
            retries = self.config.options.retry.budget(),
            "http client built"
        );
        Ok(HttpClient::new(transport, self.config))
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| HttpClientError::Env(format!("{name} has invalid value '{raw}'"))),
        Err(_) => Ok(None),
    }
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{normalize_bearer_authorization, ClientBuilder};
    use crate::{HttpClientError, Interceptor, LogLevel, ServerErrorPolicy};

    #[test]
    fn normalize_bearer_adds_prefix_when_missing() {
        assert_eq!(
            normalize_bearer_authorization("abc123"),
            "Bearer abc123".to_owned()
        );
    }

    #[test]
    fn normalize_bearer_keeps_existing_prefix() {
        assert_eq!(
            normalize_bearer_authorization("bEaReR abc123"),
            "bEaReR abc123".to_owned()
        );
    }

    #[test]
    fn setters_accumulate_into_config() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/api/")
            .log_level(LogLevel::Headers)
            .request_timeout_ms(1_000)
            .connect_timeout_ms(2_000)
            .socket_timeout_ms(4_000)
            .retry(true, 3)
            .retry_delay_unit(Duration::from_millis(10))
            .follow_redirects(false)
            .server_error_policy(ServerErrorPolicy::Error)
            .interceptor(Interceptor::new())
            .interceptor(Interceptor::new())
            .build()
            .expect("configuration must be valid");

        let config = client.config();
        assert_eq!(config.base_url(), "http://localhost:8080/api/");
        assert_eq!(config.log_level(), LogLevel::Headers);
        assert_eq!(config.interceptor_count(), 2);
        let options = config.options();
        assert_eq!(options.timeouts.request_ms, 1_000);
        assert_eq!(options.timeouts.connect_ms, 2_000);
        assert_eq!(options.timeouts.socket_ms, 4_000);
        assert_eq!(options.retry.budget(), 3);
        assert_eq!(options.retry.delay_unit, Duration::from_millis(10));
        assert!(!options.follow_redirects);
        assert_eq!(options.server_errors, ServerErrorPolicy::Error);
    }

    #[test]
    fn retry_count_ignored_when_disabled() {
        let client = ClientBuilder::new()
            .retry(false, 5)
            .build()
            .expect("configuration must be valid");
        assert_eq!(client.config().options().retry.budget(), 0);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ClientBuilder::new()
            .connect_timeout_ms(0)
            .build()
            .expect_err("zero timeout must be rejected");
        assert!(matches!(err, HttpClientError::InvalidConfig(message) if message.contains("connect")));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ClientBuilder::new()
            .base_url("not a url")
            .build()
            .expect_err("base url must be rejected");
        assert!(matches!(err, HttpClientError::InvalidConfig(_)));
    }

    #[test]
    fn invalid_default_header_is_rejected() {
        let err = ClientBuilder::new()
            .default_header("bad header", "value")
            .build()
            .expect_err("header name must be rejected");
        assert!(matches!(err, HttpClientError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_authorization_value() {
        let client = ClientBuilder::new()
            .bearer_auth("secret-token")
            .build()
            .expect("configuration must be valid");
        let debug = format!("{:?}", client.config());
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }
}
