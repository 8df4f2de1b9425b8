//! HTTP-specific error types for the commercetools client.
//!
//! # Error Handling
//!
//! - [`ApiError`]: a non-2xx response surfaced to the caller
//! - [`ConflictError`]: a 409 version conflict, retried by
//!   [`retry_on_conflict`](crate::clients::retry_on_conflict) where enabled
//! - [`MalformedConflictError`]: a conflict without the server's current version
//! - [`MaxConflictRetriesExceededError`]: conflict retries ran out
//! - [`InvalidHttpRequestError`]: a request failed validation before sending
//! - [`HttpError`]: the unified error returned by every request
//!
//! # Example
//!
//! ```rust,ignore
//! use commercetools_client::HttpError;
//!
//! match orders.with_id("abc").get(&QueryArgs::new()).await {
//!     Ok(response) => println!("Order: {}", response.body),
//!     Err(HttpError::Api(e)) if e.status == 404 => println!("No such order"),
//!     Err(HttpError::RetryExhausted(e)) => println!("Gave up after {} attempts", e.attempts),
//!     Err(e) => println!("Request failed: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::auth::AuthError;
use crate::clients::http_response::{HttpResponse, ResponseError};
use crate::error::ConfigError;

/// Error returned when a request receives a non-successful response.
///
/// Displays as `"<status> (<code>) error: <message>"`.
///
/// # Example
///
/// ```rust
/// use commercetools_client::clients::ApiError;
///
/// let error = ApiError {
///     status: 404,
///     code: "ResourceNotFound".to_string(),
///     message: "The Resource with ID 'abc' was not found.".to_string(),
///     token_invalid: false,
///     correlation_id: None,
///     body: serde_json::Value::Null,
/// };
///
/// assert_eq!(
///     error.to_string(),
///     "404 (ResourceNotFound) error: The Resource with ID 'abc' was not found."
/// );
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{status} ({code}) error: {message}")]
pub struct ApiError {
    /// The status reported by the API.
    pub status: u16,
    /// The API error code, or `"unknown"`.
    pub code: String,
    /// The API error message.
    pub message: String,
    /// Whether the API reported the access token as invalid.
    pub token_invalid: bool,
    /// Correlation ID for support requests (from `X-Correlation-ID`).
    pub correlation_id: Option<String>,
    /// The raw response body.
    pub body: serde_json::Value,
}

impl ApiError {
    /// Builds the error from a failed response.
    #[must_use]
    pub fn from_response(response: &HttpResponse, error: &ResponseError) -> Self {
        Self {
            status: error.status,
            code: error.code.clone(),
            message: error.message.clone(),
            token_invalid: error.token_invalid,
            correlation_id: response.correlation_id().map(String::from),
            body: response.body.clone(),
        }
    }

    /// Returns `true` if the API reported the access token as invalid.
    #[must_use]
    pub const fn is_token_invalid(&self) -> bool {
        self.token_invalid
    }
}

/// Error returned for an HTTP 409 version conflict.
///
/// `current_version` is the version the server holds, taken from the first
/// error entry that reports one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{status} ({code}) error: {message}")]
pub struct ConflictError {
    /// The status reported by the API (409).
    pub status: u16,
    /// The API error code, typically `ConcurrentModification`.
    pub code: String,
    /// The API error message.
    pub message: String,
    /// The server's current resource version, if reported.
    pub current_version: Option<i64>,
    /// Correlation ID for support requests.
    pub correlation_id: Option<String>,
}

impl ConflictError {
    /// Builds the error from a 409 response.
    #[must_use]
    pub fn from_response(response: &HttpResponse, error: &ResponseError) -> Self {
        Self {
            status: error.status,
            code: error.code.clone(),
            message: error.message.clone(),
            current_version: error.current_version(),
            correlation_id: response.correlation_id().map(String::from),
        }
    }
}

/// Error returned when a conflicting versioned request cannot be retried
/// because the conflict did not report the server's current version.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Version conflict without currentVersion, cannot retry: {conflict}")]
pub struct MalformedConflictError {
    /// The conflict that was received.
    pub conflict: ConflictError,
}

/// Error returned when conflict retries are exhausted.
///
/// # Example
///
/// ```rust
/// use commercetools_client::clients::{ConflictError, MaxConflictRetriesExceededError};
///
/// let error = MaxConflictRetriesExceededError {
///     attempts: 3,
///     last: ConflictError {
///         status: 409,
///         code: "ConcurrentModification".to_string(),
///         message: "Object 1 has a different version than expected.".to_string(),
///         current_version: Some(7),
///         correlation_id: None,
///     },
/// };
///
/// assert!(error.to_string().starts_with("Exceeded maximum retry count of 3."));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Exceeded maximum retry count of {attempts}. Last conflict: {last}")]
pub struct MaxConflictRetriesExceededError {
    /// The number of attempts that were made.
    pub attempts: u32,
    /// The last conflict received.
    pub last: ConflictError,
}

/// Error returned when a request fails validation before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// The request path is empty.
    #[error("Request path cannot be empty.")]
    EmptyPath,
}

/// Unified error type for all request failures.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A non-2xx response outside the conflict case.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A 409 version conflict.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// A versioned request conflicted without a reported current version.
    #[error(transparent)]
    MalformedConflict(#[from] MalformedConflictError),

    /// Conflict retries were exhausted.
    #[error(transparent)]
    RetryExhausted(#[from] MaxConflictRetriesExceededError),

    /// Obtaining an access token failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Building the client failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// A middleware aborted the request.
    #[error("Request aborted by middleware: {reason}")]
    Aborted {
        /// Why the middleware aborted.
        reason: String,
    },

    /// The middleware chain finished without producing a response.
    #[error("No response was produced for '{path}'")]
    NoResponse {
        /// The request path.
        path: String,
    },

    /// A response body could not be decoded into the requested type.
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns the status reported by the API, if this error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status),
            Self::Conflict(e) => Some(e.status),
            Self::MalformedConflict(e) => Some(e.conflict.status),
            Self::RetryExhausted(e) => Some(e.last.status),
            _ => None,
        }
    }
}

// Verify HttpError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpError>();
};
