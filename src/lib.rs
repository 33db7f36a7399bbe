//! `outcome-http` is a configurable async HTTP client on top of `reqwest`.
//!
//! Every call resolves to exactly one [`Outcome`] instead of an error:
//! - [`ClientBuilder`] assembles timeouts, logging, interceptors and retries
//! - [`HttpClient`] issues `GET`/`POST`/`PUT`/`PATCH`/`DELETE`/`OPTIONS`/`HEAD`
//!   calls, including multipart uploads
//! - [`classify`] maps statuses and transport failures to outcomes
//! - [`subscriber`] consumes outcomes through per-variant callbacks

mod builder;
pub mod classify;
mod client;
mod error;
mod interceptor;
mod logging;
mod multipart;
mod options;
mod outcome;
mod params;
mod retry;
pub mod subscriber;

pub use builder::{ClientBuilder, ClientConfig};
pub use client::HttpClient;
pub use error::HttpClientError;
pub use interceptor::Interceptor;
pub use logging::{LogLevel, LogSink, LoggingPolicy};
pub use multipart::{content_type_for, MultipartForm, FALLBACK_CONTENT_TYPE};
pub use options::{ClientOptions, ServerErrorPolicy, Timeouts, DEFAULT_TIMEOUT_MS};
pub use outcome::Outcome;
pub use params::RequestParams;
pub use retry::{RetryPolicy, RETRY_COUNT_HEADER};
pub use subscriber::{consume, outcome_stream, OutcomeSubscriber};

pub use reqwest::Method;

pub type Result<T> = std::result::Result<T, HttpClientError>;
