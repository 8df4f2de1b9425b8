//! The request pipeline for commercetools API communication.
//!
//! This module provides everything between a resource call and the wire:
//! the middleware chain, the HTTP transport, response classification,
//! version-conflict retry and the time-bounded client cache.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`Pipeline`]: The assembled middleware chain for one client
//! - [`Middleware`], [`Exchange`], [`Next`]: The chain's building blocks
//! - [`HttpTransport`]: Sends requests, retrying transient failures
//! - [`HttpRequest`] / [`HttpResponse`]: What flows through the chain
//! - [`classify`]: Maps a response to success, error or conflict
//! - [`retry_on_conflict`]: Re-issues updates after a version conflict
//! - [`ClientCache`]: Keeps the built client for 900 seconds
//!
//! # Retry Behavior
//!
//! Two independent retry layers exist:
//!
//! - **Transport**: network errors and 502/503/504 responses are retried
//!   according to [`HttpRetryConfig`] (2 retries, 300 ms doubling, capped at 5 s)
//! - **Conflicts**: 409 responses to updates are retried according to
//!   [`ConflictRetryConfig`] (3 attempts, 200 ms doubling, capped at 5 s),
//!   with the request's `version` replaced by the server's current version
//!
//! # Example
//!
//! ```rust,ignore
//! use commercetools_client::clients::{HttpMethod, HttpRequest};
//!
//! let root = client.api_root().await?;
//! let request = HttpRequest::builder(HttpMethod::Get, "my-project/orders")
//!     .query_param("limit", "5")
//!     .build()?;
//! let response = root.pipeline().execute(request).await?;
//! ```

mod cache;
mod classify;
mod errors;
mod http_request;
mod http_response;
mod middleware;
mod pipeline;
mod retry;
mod transport;

pub use cache::{system_clock, CacheInvalidator, ClientCache, Clock, CLIENT_TTL_SECONDS};
pub use classify::{classify, is_fatal_status, Classification, CONFLICT_STATUS};
pub use errors::{
    ApiError, ConflictError, HttpError, InvalidHttpRequestError, MalformedConflictError,
    MaxConflictRetriesExceededError,
};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder, QueryArgs};
pub use http_response::{ErrorObject, HttpResponse, ResponseError, INVALID_TOKEN_CODE};
pub use middleware::{
    AuthMiddleware, ErrorMiddleware, Exchange, LoggerMiddleware, Middleware, Next,
    TokenInvalidMiddleware, TransportMiddleware,
};
pub use pipeline::Pipeline;
pub use retry::{retry_on_conflict, ConflictRetryConfig};
pub use transport::{HttpRetryConfig, HttpTransport, RETRYABLE_STATUSES, SDK_VERSION};
