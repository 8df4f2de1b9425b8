//! HTTP request types for the commercetools client.
//!
//! This module provides the [`HttpRequest`] type, its builder, and
//! [`QueryArgs`] for the query parameters commercetools endpoints accept.

use std::collections::HashMap;
use std::fmt;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods used by the commercetools API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating and updating resources.
    Post,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Query parameters for a commercetools request.
///
/// Parameters keep their insertion order and may repeat (`expand`, `where`).
///
/// # Example
///
/// ```rust
/// use commercetools_client::QueryArgs;
///
/// let args = QueryArgs::new()
///     .expand("paymentInfo.payments[*]")
///     .predicate(r#"orderState = "Open""#)
///     .limit(20);
///
/// assert_eq!(args.pairs()[0], ("expand".to_string(), "paymentInfo.payments[*]".to_string()));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryArgs {
    params: Vec<(String, String)>,
}

impl QueryArgs {
    /// Creates empty query args.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reference expansion path.
    #[must_use]
    pub fn expand(self, path: impl Into<String>) -> Self {
        self.param("expand", path)
    }

    /// Adds a `where` query predicate. Multiple predicates are combined by
    /// the API with `and`.
    #[must_use]
    pub fn predicate(self, predicate: impl Into<String>) -> Self {
        self.param("where", predicate)
    }

    /// Adds a sort expression, e.g. `createdAt desc`.
    #[must_use]
    pub fn sort(self, sort: impl Into<String>) -> Self {
        self.param("sort", sort)
    }

    /// Sets the page size.
    #[must_use]
    pub fn limit(self, limit: u32) -> Self {
        self.param("limit", limit.to_string())
    }

    /// Sets the page offset.
    #[must_use]
    pub fn offset(self, offset: u32) -> Self {
        self.param("offset", offset.to_string())
    }

    /// Requests the total count in paged query results.
    #[must_use]
    pub fn with_total(self, with_total: bool) -> Self {
        self.param("withTotal", with_total.to_string())
    }

    /// Adds an arbitrary parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Returns `true` if no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the parameters in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }
}

/// An HTTP request to be sent through the pipeline.
///
/// `path` is relative to the API host and already includes the project key.
///
/// # Example
///
/// ```rust
/// use commercetools_client::clients::{HttpRequest, HttpMethod};
/// use serde_json::json;
///
/// let request = HttpRequest::builder(HttpMethod::Post, "my-project/orders/abc")
///     .body(json!({"version": 3, "actions": []}))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.version(), Some(3));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The path relative to the API host.
    pub path: String,
    /// The JSON request body, if any.
    pub body: Option<serde_json::Value>,
    /// Query parameters to append to the URL.
    pub query: Vec<(String, String)>,
    /// Additional headers to include in the request.
    pub extra_headers: HashMap<String, String>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, path)
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the path is empty or a POST has
    /// no body.
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.path.trim_matches('/').is_empty() {
            return Err(InvalidHttpRequestError::EmptyPath);
        }

        if self.http_method == HttpMethod::Post && self.body.is_none() {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            });
        }

        Ok(())
    }

    /// Returns the optimistic-concurrency `version` carried in the body.
    #[must_use]
    pub fn version(&self) -> Option<i64> {
        self.body
            .as_ref()
            .and_then(|body| body.get("version"))
            .and_then(serde_json::Value::as_i64)
    }

    /// Overwrites the body's `version` field. Returns `false` if the body has
    /// no `version` to overwrite.
    pub fn set_version(&mut self, version: i64) -> bool {
        match self
            .body
            .as_mut()
            .and_then(serde_json::Value::as_object_mut)
            .and_then(|body| body.get_mut("version"))
        {
            Some(slot) => {
                *slot = serde_json::Value::from(version);
                true
            }
            None => false,
        }
    }

    /// Sets a header, replacing any previous value.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra_headers.insert(key.into(), value.into());
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    path: String,
    body: Option<serde_json::Value>,
    query: Vec<(String, String)>,
    extra_headers: HashMap<String, String>,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            http_method: method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            extra_headers: HashMap::new(),
        }
    }

    /// Sets the JSON request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Appends all parameters from `args`.
    #[must_use]
    pub fn query(mut self, args: &QueryArgs) -> Self {
        self.query.extend(args.pairs().iter().cloned());
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            path: self.path,
            body: self.body,
            query: self.query,
            extra_headers: self.extra_headers,
        };
        request.verify()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "get");
        assert_eq!(HttpMethod::Post.to_string(), "post");
        assert_eq!(HttpMethod::Delete.to_string(), "delete");
    }

    #[test]
    fn test_verify_requires_body_for_post() {
        let result = HttpRequest::builder(HttpMethod::Post, "p/orders").build();

        assert!(matches!(
            result,
            Err(InvalidHttpRequestError::MissingBody { method }) if method == "post"
        ));
    }

    #[test]
    fn test_verify_rejects_empty_path() {
        let result = HttpRequest::builder(HttpMethod::Get, "/").build();
        assert_eq!(result, Err(InvalidHttpRequestError::EmptyPath));
    }

    #[test]
    fn test_query_args_keep_order_and_repeats() {
        let request = HttpRequest::builder(HttpMethod::Get, "p/orders")
            .query(&QueryArgs::new().expand("a").expand("b").limit(5))
            .build()
            .unwrap();

        assert_eq!(
            request.query,
            vec![
                ("expand".to_string(), "a".to_string()),
                ("expand".to_string(), "b".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_version_is_read_and_overwritten() {
        let mut request = HttpRequest::builder(HttpMethod::Post, "p/orders/1")
            .body(json!({"version": 3, "actions": []}))
            .build()
            .unwrap();

        assert_eq!(request.version(), Some(3));
        assert!(request.set_version(4));
        assert_eq!(request.version(), Some(4));
        assert_eq!(request.body.unwrap()["actions"], json!([]));
    }

    #[test]
    fn test_set_version_without_version_field_is_noop() {
        let mut request = HttpRequest::builder(HttpMethod::Post, "p/orders")
            .body(json!({"orderNumber": "1"}))
            .build()
            .unwrap();

        assert_eq!(request.version(), None);
        assert!(!request.set_version(4));
        assert!(request.body.unwrap().get("version").is_none());
    }

    #[test]
    fn test_builder_with_extra_headers() {
        let request = HttpRequest::builder(HttpMethod::Get, "p")
            .header("X-Correlation-ID", "abc")
            .build()
            .unwrap();

        assert_eq!(
            request.extra_headers.get("X-Correlation-ID"),
            Some(&"abc".to_string())
        );
    }
}
