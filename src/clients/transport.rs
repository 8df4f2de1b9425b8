//! HTTP transport for the commercetools API.
//!
//! [`HttpTransport`] sends a single [`HttpRequest`] to `{host}/{path}` and
//! turns the reply into an [`HttpResponse`]. It retries network errors and
//! gateway failures (502, 503, 504) with exponential backoff; it does not
//! interpret any other status.

use std::collections::HashMap;
use std::time::Duration;

use crate::clients::errors::HttpError;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::ApiUrl;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Status codes the transport retries.
pub const RETRYABLE_STATUSES: [u16; 3] = [502, 503, 504];

/// Retry settings for transient transport failures.
///
/// # Example
///
/// ```rust
/// use commercetools_client::HttpRetryConfig;
/// use std::time::Duration;
///
/// let retry = HttpRetryConfig::default();
/// assert_eq!(retry.delay_for_retry(0), Duration::from_millis(300));
/// assert_eq!(retry.delay_for_retry(1), Duration::from_millis(600));
/// assert_eq!(retry.delay_for_retry(10), Duration::from_millis(5000));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HttpRetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub retry_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl HttpRetryConfig {
    /// A config that never retries.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            max_retries: 0,
            retry_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Returns the delay before retry number `retry` (zero-based).
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.retry_delay
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.max_delay)
    }
}

impl Default for HttpRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_millis(300),
            max_delay: Duration::from_millis(5000),
        }
    }
}

/// Sends requests to the commercetools API host.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    host: ApiUrl,
    default_headers: HashMap<String, String>,
    retry: HttpRetryConfig,
}

// Verify HttpTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpTransport>();
};

impl HttpTransport {
    /// Creates a transport for `host`.
    ///
    /// The `User-Agent` header is `"{prefix} | commercetools-client v{version} | Rust {rust}"`,
    /// with the prefix part omitted when none is given.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        host: ApiUrl,
        retry: HttpRetryConfig,
        user_agent_prefix: Option<&str>,
    ) -> Self {
        let user_agent_prefix = user_agent_prefix.map_or(String::new(), |p| format!("{p} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}commercetools-client v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        Self {
            client,
            host,
            default_headers,
            retry,
        }
    }

    /// Returns the API host.
    #[must_use]
    pub const fn host(&self) -> &ApiUrl {
        &self.host
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends `request`, retrying transient failures.
    ///
    /// Any HTTP status is returned as a response; classification happens
    /// further down the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] when the request cannot be completed
    /// after all retries.
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = self.host.join(&request.path);

        let mut headers = self.default_headers.clone();
        for (key, value) in &request.extra_headers {
            headers.insert(key.clone(), value.clone());
        }

        let mut retries: u32 = 0;
        loop {
            let mut req_builder = match request.http_method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
                HttpMethod::Delete => self.client.delete(&url),
            };

            for (key, value) in &headers {
                req_builder = req_builder.header(key, value);
            }

            if !request.query.is_empty() {
                req_builder = req_builder.query(&request.query);
            }

            if let Some(body) = &request.body {
                req_builder = req_builder
                    .header("Content-Type", "application/json")
                    .body(body.to_string());
            }

            let can_retry = retries < self.retry.max_retries;

            let res = match req_builder.send().await {
                Ok(res) => res,
                Err(e) if can_retry => {
                    let delay = self.retry.delay_for_retry(retries);
                    tracing::warn!(
                        "Request to {} failed ({}), retrying in {:?}",
                        request.path,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    retries += 1;
                    continue;
                }
                Err(e) => return Err(HttpError::Network(e)),
            };

            let code = res.status().as_u16();
            if can_retry && RETRYABLE_STATUSES.contains(&code) {
                let delay = self.retry.delay_for_retry(retries);
                tracing::warn!(
                    "Request to {} returned {}, retrying in {:?}",
                    request.path,
                    code,
                    delay
                );
                tokio::time::sleep(delay).await;
                retries += 1;
                continue;
            }

            let res_headers = Self::parse_response_headers(res.headers());
            let body_text = res.text().await?;
            let body = Self::parse_body(&body_text);

            return Ok(HttpResponse::new(code, res_headers, body));
        }
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    // Non-JSON bodies (gateway error pages) are kept as a string.
    fn parse_body(text: &str) -> serde_json::Value {
        if text.is_empty() {
            return serde_json::json!({});
        }
        serde_json::from_str(text).unwrap_or_else(|_| serde_json::json!({ "raw_body": text }))
    }
}
