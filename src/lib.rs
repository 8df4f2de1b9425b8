//! # commercetools API client
//!
//! An async client wrapper around the commercetools HTTP API, providing
//! authenticated request pipelines, client caching, version-conflict retry
//! and small helpers for common resources.
//!
//! ## Overview
//!
//! This crate provides:
//! - Configuration via [`ClientConfig`] and [`ClientConfigBuilder`], with
//!   `CT_*` / `CTP_*` environment fallback
//! - Three ways to authenticate: client credentials, a pre-issued token, or
//!   an async callback returning either
//! - A middleware pipeline that classifies error responses into [`HttpError`]
//! - A client cache that rebuilds after 900 seconds or when the API reports
//!   an invalid token
//! - Automatic retry of 409 version conflicts with the server's current version
//! - Request builders for projects and resources, typed getters for orders
//!   and payments, and [`query_predicate`] helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use commercetools_client::{ApiUrl, AuthSpec, ClientConfig, CommercetoolsClient, CredentialsSpec, ProjectKey};
//! use std::collections::HashMap;
//!
//! let config = ClientConfig::builder()
//!     .host(ApiUrl::new("https://api.europe-west1.gcp.commercetools.com").unwrap())
//!     .project_key(ProjectKey::new("my-project").unwrap())
//!     .auth(AuthSpec::Credentials(
//!         CredentialsSpec::new()
//!             .host("https://auth.europe-west1.gcp.commercetools.com")
//!             .client_id("my-client-id")
//!             .client_secret("my-client-secret"),
//!     ))
//!     .build_with_env(HashMap::new())
//!     .unwrap();
//!
//! let client = CommercetoolsClient::new(config);
//! ```
//!
//! ## Making Requests
//!
//! ```rust,ignore
//! use commercetools_client::QueryArgs;
//!
//! let project = client.project_api().await?;
//! let order = project
//!     .orders()
//!     .with_order_number("10001")
//!     .get(&QueryArgs::new().expand("paymentInfo.payments[*]"))
//!     .await?;
//! ```
//!
//! ## Customer-Scoped Requests
//!
//! ```rust,ignore
//! let actions = client.token_scoped_actions(customer_token);
//! let order = actions.orders.get_my_order("a0b1c2", &QueryArgs::new()).await?;
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber.
//! Enable [`ClientConfigBuilder::log_enabled`] for one `debug!` event per
//! request.

pub mod actions;
pub mod api;
pub mod auth;
pub mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod query_predicate;

// Re-export public types at crate root for convenience
pub use actions::{CtActions, ResourceGetter, TokenScopedCtActions};
pub use api::{ApiRoot, ItemEndpoint, ProjectApi, ResourceEndpoint};
pub use auth::{AuthError, AuthSpec, CredentialsSpec, ResolvedAuth, Scopes};
pub use client::CommercetoolsClient;
pub use config::{
    ApiUrl, ClientConfig, ClientConfigBuilder, ClientId, ClientSecret, EnvSource, ProcessEnv,
    ProjectKey,
};
pub use error::ConfigError;

// Re-export pipeline types
pub use clients::{
    ApiError, ConflictError, ConflictRetryConfig, HttpError, HttpMethod, HttpRequest,
    HttpResponse, HttpRetryConfig, MalformedConflictError, MaxConflictRetriesExceededError,
    Middleware, QueryArgs,
};
