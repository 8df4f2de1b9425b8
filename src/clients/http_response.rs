//! HTTP response types for the commercetools client.
//!
//! A non-2xx [`HttpResponse`] carries a parsed [`ResponseError`]. The error
//! body commercetools returns looks like:
//!
//! ```json
//! {
//!   "statusCode": 409,
//!   "message": "Object 1 has a different version than expected. Expected: 3 - Actual: 4.",
//!   "errors": [
//!     { "code": "ConcurrentModification", "message": "...", "currentVersion": 4 }
//!   ]
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Error code the API uses for expired or revoked access tokens.
pub const INVALID_TOKEN_CODE: &str = "invalid_token";

/// One entry of the `errors` array in an error body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorObject {
    /// The error code, e.g. `ConcurrentModification`.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// The server's current version, on version conflicts.
    #[serde(default)]
    pub current_version: Option<i64>,
}

/// The error part of a failed response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseError {
    /// The status reported in the body, or the HTTP status.
    pub status: u16,
    /// The error code, or `"unknown"`.
    pub code: String,
    /// The error message, or the HTTP reason phrase.
    pub message: String,
    /// The individual errors.
    pub errors: Vec<ErrorObject>,
    /// Whether the body marks the access token as invalid.
    pub token_invalid: bool,
}

impl ResponseError {
    /// Parses the error from a response status and body.
    #[must_use]
    pub fn from_body(code: u16, body: &serde_json::Value) -> Self {
        let errors: Vec<ErrorObject> = body
            .get("errors")
            .and_then(|errors| serde_json::from_value(errors.clone()).ok())
            .unwrap_or_default();

        let status = body
            .get("statusCode")
            .or_else(|| body.get("status"))
            .and_then(serde_json::Value::as_u64)
            .and_then(|s| u16::try_from(s).ok())
            .unwrap_or(code);

        let oauth_error = body.get("error").and_then(serde_json::Value::as_str);

        let error_code = body
            .get("code")
            .and_then(serde_json::Value::as_str)
            .map(String::from)
            .or_else(|| errors.iter().find_map(|e| e.code.clone()))
            .or_else(|| oauth_error.map(String::from))
            .unwrap_or_else(|| "unknown".to_string());

        let message = body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| {
                reqwest::StatusCode::from_u16(code)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        let token_invalid = error_code == INVALID_TOKEN_CODE
            || oauth_error == Some(INVALID_TOKEN_CODE)
            || errors
                .iter()
                .any(|e| e.code.as_deref() == Some(INVALID_TOKEN_CODE));

        Self {
            status,
            code: error_code,
            message,
            errors,
            token_invalid,
        }
    }

    /// Returns the first `currentVersion` reported by any error entry.
    #[must_use]
    pub fn current_version(&self) -> Option<i64> {
        self.errors.iter().find_map(|e| e.current_version)
    }
}

/// An HTTP response from the commercetools API.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, lower-cased (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: serde_json::Value,
    /// The parsed error, present iff the status is not 2xx.
    pub error: Option<ResponseError>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing the error body for non-2xx codes.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: serde_json::Value) -> Self {
        let error = if (200..=299).contains(&code) {
            None
        } else {
            Some(ResponseError::from_body(code, &body))
        };

        Self {
            code,
            headers,
            body,
            error,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Returns the first value of a header (by lower-cased name).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `X-Correlation-ID` header value.
    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        self.header("x-correlation-id")
    }

    /// Returns `true` if the API reported the access token as invalid.
    #[must_use]
    pub fn is_token_invalid(&self) -> bool {
        self.error.as_ref().is_some_and(|e| e.token_invalid)
    }
}
