use std::{fmt, sync::Arc};

type RequestHook = Arc<dyn Fn(&mut reqwest::Request) + Send + Sync>;
type ResponseHook = Arc<dyn Fn(&reqwest::Response) + Send + Sync>;

/// Pair of hooks run around every attempt, retries included.
///
/// Interceptors run in registration order. The request hook may mutate the
/// outgoing request; the response hook observes the response before its body
/// is read.
#[derive(Clone, Default)]
pub struct Interceptor {
    on_request: Option<RequestHook>,
    on_response: Option<ResponseHook>,
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("on_request", &self.on_request.is_some())
            .field("on_response", &self.on_response.is_some())
            .finish()
    }
}

impl Interceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hook run before the request is dispatched.
    pub fn on_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut reqwest::Request) + Send + Sync + 'static,
    {
        self.on_request = Some(Arc::new(hook));
        self
    }

    /// Sets the hook run once the response headers arrive.
    pub fn on_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&reqwest::Response) + Send + Sync + 'static,
    {
        self.on_response = Some(Arc::new(hook));
        self
    }

    pub(crate) fn before_request(&self, request: &mut reqwest::Request) {
        if let Some(hook) = &self.on_request {
            hook(request);
        }
    }

    pub(crate) fn after_response(&self, response: &reqwest::Response) {
        if let Some(hook) = &self.on_response {
            hook(response);
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{header::HeaderValue, Method, Request, Url};

    use super::Interceptor;

    #[test]
    fn request_hook_mutates_request() {
        let interceptor = Interceptor::new().on_request(|request| {
            request
                .headers_mut()
                .insert("x-client", HeaderValue::from_static("tests"));
        });
        let url = Url::parse("http://localhost/items").expect("valid url");
        let mut request = Request::new(Method::GET, url);

        interceptor.before_request(&mut request);

        assert_eq!(
            request.headers().get("x-client"),
            Some(&HeaderValue::from_static("tests"))
        );
    }

    #[test]
    fn missing_hooks_are_no_ops() {
        let interceptor = Interceptor::new();
        let url = Url::parse("http://localhost/").expect("valid url");
        let mut request = Request::new(Method::POST, url);
        interceptor.before_request(&mut request);
        assert!(request.headers().is_empty());
        assert_eq!(
            format!("{interceptor:?}"),
            "Interceptor { on_request: false, on_response: false }"
        );
    }
}
