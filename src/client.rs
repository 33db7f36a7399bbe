use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use reqwest::{Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use tokio::time::sleep;

use crate::{
    builder::ClientConfig,
    classify::{classify_response, classify_transport_error, unclassified},
    multipart::LoadedForm,
    retry::RETRY_COUNT_HEADER,
    MultipartForm, Outcome, RequestParams,
};

enum Payload {
    Empty,
    Json(JsonValue),
    Multipart(LoadedForm),
}

#[derive(Clone)]
/// HTTP client whose calls always resolve to an [`Outcome`].
///
/// Built by [`crate::ClientBuilder`]. Clones share the same transport and the
/// same read-only configuration.
pub struct HttpClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish()
    }
}

impl HttpClient {
    pub(crate) fn new(http: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            http,
            config: Arc::new(config),
        }
    }

    /// Configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends a GET request.
    pub async fn get<T, P>(&self, path: &str, params: P) -> Outcome<T>
    where
        T: DeserializeOwned,
        P: Into<RequestParams>,
    {
        self.execute(Method::GET, path, params.into(), Payload::Empty)
            .await
    }

    /// Sends a HEAD request; a successful outcome carries no body.
    pub async fn head<T, P>(&self, path: &str, params: P) -> Outcome<T>
    where
        T: DeserializeOwned,
        P: Into<RequestParams>,
    {
        self.execute(Method::HEAD, path, params.into(), Payload::Empty)
            .await
    }

    /// Sends an OPTIONS request.
    pub async fn options<T, P>(&self, path: &str, params: P) -> Outcome<T>
    where
        T: DeserializeOwned,
        P: Into<RequestParams>,
    {
        self.execute(Method::OPTIONS, path, params.into(), Payload::Empty)
            .await
    }

    /// Sends a DELETE request without a body.
    pub async fn delete<T, P>(&self, path: &str, params: P) -> Outcome<T>
    where
        T: DeserializeOwned,
        P: Into<RequestParams>,
    {
        self.execute(Method::DELETE, path, params.into(), Payload::Empty)
            .await
    }

    /// Sends a POST with an optional JSON body.
    ///
    /// Pass `None::<&()>` to send no body.
    pub async fn post<T, P, B>(&self, path: &str, params: P, body: Option<&B>) -> Outcome<T>
    where
        T: DeserializeOwned,
        P: Into<RequestParams>,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, params, body).await
    }

    /// Sends a PUT with an optional JSON body.
    pub async fn put<T, P, B>(&self, path: &str, params: P, body: Option<&B>) -> Outcome<T>
    where
        T: DeserializeOwned,
        P: Into<RequestParams>,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, params, body).await
    }

    /// Sends a PATCH with an optional JSON body.
    pub async fn patch<T, P, B>(&self, path: &str, params: P, body: Option<&B>) -> Outcome<T>
    where
        T: DeserializeOwned,
        P: Into<RequestParams>,
        B: Serialize + ?Sized,
    {
        self.send(Method::PATCH, path, params, body).await
    }

    /// Sends a POST with a `multipart/form-data` body.
    ///
    /// Files are read before the first attempt; a missing file resolves to
    /// an error without sending anything.
    pub async fn post_multipart<T, P>(
        &self,
        path: &str,
        params: P,
        form: MultipartForm,
    ) -> Outcome<T>
    where
        T: DeserializeOwned,
        P: Into<RequestParams>,
    {
        self.send_multipart(Method::POST, path, params.into(), form)
            .await
    }

    /// Sends a PUT with a `multipart/form-data` body.
    pub async fn put_multipart<T, P>(
        &self,
        path: &str,
        params: P,
        form: MultipartForm,
    ) -> Outcome<T>
    where
        T: DeserializeOwned,
        P: Into<RequestParams>,
    {
        self.send_multipart(Method::PUT, path, params.into(), form)
            .await
    }

    /// Sends a PATCH with a `multipart/form-data` body.
    pub async fn patch_multipart<T, P>(
        &self,
        path: &str,
        params: P,
        form: MultipartForm,
    ) -> Outcome<T>
    where
        T: DeserializeOwned,
        P: Into<RequestParams>,
    {
        self.send_multipart(Method::PATCH, path, params.into(), form)
            .await
    }

    /// Sends a request with any method and an optional JSON body.
    pub async fn send<T, P, B>(
        &self,
        method: Method,
        path: &str,
        params: P,
        body: Option<&B>,
    ) -> Outcome<T>
    where
        T: DeserializeOwned,
        P: Into<RequestParams>,
        B: Serialize + ?Sized,
    {
        let payload = match body.map(serde_json::to_value).transpose() {
            Ok(Some(value)) => Payload::Json(value),
            Ok(None) => Payload::Empty,
            Err(err) => {
                return unclassified(&format!("failed to serialize request body: {err}"));
            }
        };
        self.execute(method, path, params.into(), payload).await
    }

    async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: RequestParams,
        form: MultipartForm,
    ) -> Outcome<T> {
        match form.load().await {
            Ok(form) => {
                self.execute(method, path, params, Payload::Multipart(form))
                    .await
            }
            Err(message) => unclassified(&message),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: RequestParams,
        payload: Payload,
    ) -> Outcome<T> {
        let url = match self.resolve_url(path) {
            Ok(url) => url,
            Err(message) => return unclassified(&message),
        };
        let retry = &self.config.options.retry;
        let mut retries = 0u32;

        loop {
            let request = match self.build_request(&method, &url, &params, &payload, retries) {
                Ok(request) => request,
                Err(err) => return unclassified(&format!("failed to build request: {err}")),
            };

            match self.attempt(request).await {
                Ok((status, body)) => {
                    if retry.should_retry_status(status) && retry.allows(retries) {
                        retries += 1;
                        self.wait_before_retry(retries, &method, &url).await;
                        continue;
                    }
                    let outcome =
                        classify_response(status, &body, self.config.options.server_errors);
                    if !outcome.is_success() {
                        tracing::debug!(
                            %method,
                            %url,
                            status = status.as_u16(),
                            attempts = retries + 1,
                            "request finished without success"
                        );
                    }
                    return outcome;
                }
                Err(err) => {
                    self.config
                        .logging
                        .failure(&method, &url, &err.to_string());
                    if retry.should_retry_transport(&err) && retry.allows(retries) {
                        retries += 1;
                        self.wait_before_retry(retries, &method, &url).await;
                        continue;
                    }
                    tracing::warn!(
                        %method,
                        %url,
                        attempts = retries + 1,
                        error = %err,
                        "request failed"
                    );
                    return classify_transport_error(&err);
                }
            }
        }
    }

    fn build_request(
        &self,
        method: &Method,
        url: &Url,
        params: &RequestParams,
        payload: &Payload,
        retries: u32,
    ) -> Result<reqwest::Request, reqwest::Error> {
        let mut builder = self.http.request(method.clone(), url.clone());
        for (name, value) in &params.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !params.query.is_empty() {
            builder = builder.query(&params.query);
        }
        builder = match payload {
            Payload::Empty => builder,
            Payload::Json(value) => builder.json(value),
            Payload::Multipart(form) => builder.multipart(form.to_form()?),
        };
        if retries > 0 {
            builder = builder.header(RETRY_COUNT_HEADER, retries.to_string());
        }

        let mut request = builder.build()?;
        for interceptor in &self.config.interceptors {
            interceptor.before_request(&mut request);
        }

        let logging = &self.config.logging;
        logging.request_line(request.method(), request.url());
        logging.headers(request.headers());
        match payload {
            Payload::Empty => {}
            Payload::Json(value) => logging.body(&value.to_string()),
            Payload::Multipart(_) => logging.body("<multipart body>"),
        }
        Ok(request)
    }

    async fn attempt(
        &self,
        request: reqwest::Request,
    ) -> Result<(StatusCode, String), reqwest::Error> {
        let started = Instant::now();
        let response = self.http.execute(request).await?;
        for interceptor in &self.config.interceptors {
            interceptor.after_response(&response);
        }

        let status = response.status();
        let logging = &self.config.logging;
        logging.status_line(status, response.url(), started.elapsed().as_millis());
        logging.headers(response.headers());

        let body = response.text().await?;
        logging.body(&body);
        Ok((status, body))
    }

    fn resolve_url(&self, path: &str) -> Result<Url, String> {
        if let Some(url) = absolute_url(path) {
            return Ok(url);
        }
        let base = self.config.base_url.trim_end_matches('/');
        if base.is_empty() {
            return Err(format!("relative path '{path}' requires a base url"));
        }
        let joined = match path.trim_start_matches('/') {
            "" => base.to_owned(),
            relative => format!("{base}/{relative}"),
        };
        Url::parse(&joined).map_err(|err| format!("invalid request url '{joined}': {err}"))
    }

    /// Waits `retry * delay_unit` before the given retry.
    async fn wait_before_retry(&self, retry: u32, method: &Method, url: &Url) {
        let delay: Duration = self.config.options.retry.delay_for(retry);
        tracing::debug!(
            %method,
            %url,
            retry,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "retrying request"
        );
        sleep(delay).await;
    }
}

/// Parses `path` as a full URL only when it names an http(s) host.
///
/// Relative paths such as `users:batchGet` parse as URLs with a `users`
/// scheme and must be joined to the base instead.
fn absolute_url(path: &str) -> Option<Url> {
    Url::parse(path)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}
