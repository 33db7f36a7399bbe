//! Request/response logging policy.

use std::{fmt, sync::Arc};

use reqwest::header::{HeaderMap, AUTHORIZATION, PROXY_AUTHORIZATION};

/// What gets logged for each exchange.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogLevel {
    /// Request/status lines, headers and bodies.
    All,
    /// Request/status lines and headers.
    Headers,
    /// Request/status lines and bodies.
    Body,
    /// Request/status lines only.
    Info,
    #[default]
    None,
}

impl LogLevel {
    pub fn logs_info(self) -> bool {
        self != Self::None
    }

    pub fn logs_headers(self) -> bool {
        matches!(self, Self::All | Self::Headers)
    }

    pub fn logs_body(self) -> bool {
        matches!(self, Self::All | Self::Body)
    }
}

/// Receives every log line produced under the configured [`LogLevel`].
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Log level plus an optional sink.
///
/// Without a sink, lines are emitted as `tracing` debug events.
#[derive(Clone, Default)]
pub struct LoggingPolicy {
    pub level: LogLevel,
    pub sink: Option<LogSink>,
}

impl fmt::Debug for LoggingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingPolicy")
            .field("level", &self.level)
            .field("sink", &self.sink.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl LoggingPolicy {
    pub(crate) fn request_line(&self, method: &reqwest::Method, url: &reqwest::Url) {
        if self.level.logs_info() {
            self.emit(&format!("--> {method} {url}"));
        }
    }

    pub(crate) fn status_line(&self, status: reqwest::StatusCode, url: &reqwest::Url, ms: u128) {
        if self.level.logs_info() {
            self.emit(&format!("<-- {} {url} ({ms} ms)", status.as_u16()));
        }
    }

    pub(crate) fn headers(&self, headers: &HeaderMap) {
        if !self.level.logs_headers() {
            return;
        }
        for (name, value) in headers {
            let value = if name == AUTHORIZATION || name == PROXY_AUTHORIZATION {
                "<redacted>"
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            self.emit(&format!("{name}: {value}"));
        }
    }

    pub(crate) fn body(&self, body: &str) {
        if self.level.logs_body() && !body.is_empty() {
            self.emit(body);
        }
    }

    pub(crate) fn failure(&self, method: &reqwest::Method, url: &reqwest::Url, err: &str) {
        if self.level.logs_info() {
            self.emit(&format!("<-- FAILED {method} {url}: {err}"));
        }
    }

    fn emit(&self, line: &str) {
        match &self.sink {
            Some(sink) => sink(line),
            None => tracing::debug!(target: "outcome_http", "{line}"),
        }
    }
}
