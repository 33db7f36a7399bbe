/// Per-call headers and query parameters.
///
/// Both maps keep insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestParams {
    /// Extra headers merged over the client's default headers.
    pub headers: Vec<(String, String)>,
    /// Query pairs appended to the URL.
    pub query: Vec<(String, String)>,
}

impl RequestParams {
    /// Empty params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a query pair.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Builds params from header and query iterators.
    pub fn from_maps<H, Q, K, V>(headers: H, query: Q) -> Self
    where
        H: IntoIterator<Item = (K, V)>,
        Q: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
            query: query
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    fn with_query<I, K, V>(mut self, query: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(query.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

impl From<()> for RequestParams {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for RequestParams
where
    K: Into<String>,
    V: Into<String>,
{
    /// Treats the pairs as query parameters.
    fn from(query: [(K, V); N]) -> Self {
        Self::default().with_query(query)
    }
}

#[cfg(test)]
mod tests {
    use crate::RequestParams;

    #[test]
    fn unit_is_empty() {
        let params: RequestParams = ().into();
        assert!(params.headers.is_empty());
        assert!(params.query.is_empty());
    }

    #[test]
    fn array_becomes_query() {
        let params: RequestParams = [("page", "2"), ("size", "10")].into();
        assert!(params.headers.is_empty());
        assert_eq!(params.query.len(), 2);
        assert_eq!(params.query[0], ("page".to_owned(), "2".to_owned()));
    }

    #[test]
    fn builder_keeps_order() {
        let params = RequestParams::new()
            .header("x-b", "2")
            .header("x-a", "1")
            .query("q", "rust");
        assert_eq!(params.headers[0].0, "x-b");
        assert_eq!(params.headers[1].0, "x-a");
        assert_eq!(params.query, vec![("q".to_owned(), "rust".to_owned())]);
    }

    #[test]
    fn from_maps_collects_both() {
        let params = RequestParams::from_maps([("accept", "text/plain")], [("id", "7")]);
        assert_eq!(params.headers.len(), 1);
        assert_eq!(params.query.len(), 1);
    }
}
