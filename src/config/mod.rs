//! Configuration types for the commercetools client.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ClientConfig`]: The immutable configuration for one client instance
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`ApiUrl`], [`ProjectKey`], [`ClientId`], [`ClientSecret`]: validated newtypes
//! - [`EnvSource`]: where missing settings are read from
//!
//! # Environment Fallback
//!
//! `host` and `project_key` fall back to `CT_API_URL` and `CT_PROJECT_KEY`
//! (or their `CTP_` forms) when the builder is finalized. Auth credentials are
//! resolved lazily, each time the cached client is rebuilt.
//!
//! # Example
//!
//! ```rust
//! use commercetools_client::{ApiUrl, ClientConfig, ProjectKey, AuthSpec};
//! use std::collections::HashMap;
//!
//! let config = ClientConfig::builder()
//!     .host(ApiUrl::new("https://api.europe-west1.gcp.commercetools.com").unwrap())
//!     .project_key(ProjectKey::new("my-project").unwrap())
//!     .auth(AuthSpec::token("my-token"))
//!     .build_with_env(HashMap::new())
//!     .unwrap();
//!
//! assert_eq!(config.project_key().as_ref(), "my-project");
//! ```

mod env;
mod newtypes;

pub use env::{env_property, require_env_property, EnvSource, ProcessEnv};
pub use newtypes::{ApiUrl, ClientId, ClientSecret, ProjectKey};

use std::fmt;
use std::sync::Arc;

use crate::auth::AuthSpec;
use crate::clients::{ConflictRetryConfig, HttpRetryConfig, Middleware};
use crate::error::ConfigError;

/// Configuration for a commercetools client.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`. Cloning is cheap for the
/// shared parts (middlewares, env source, auth callback).
#[derive(Clone)]
pub struct ClientConfig {
    host: ApiUrl,
    project_key: ProjectKey,
    auth: Option<AuthSpec>,
    middlewares: Vec<Arc<dyn Middleware>>,
    log_enabled: bool,
    http_retry: HttpRetryConfig,
    conflict_retry: ConflictRetryConfig,
    user_agent_prefix: Option<String>,
    http_client: Option<reqwest::Client>,
    env: Arc<dyn EnvSource>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the API host.
    #[must_use]
    pub const fn host(&self) -> &ApiUrl {
        &self.host
    }

    /// Returns the project key.
    #[must_use]
    pub const fn project_key(&self) -> &ProjectKey {
        &self.project_key
    }

    /// Returns the auth specification, if one was configured.
    ///
    /// `None` means client credentials are read entirely from the environment.
    #[must_use]
    pub const fn auth(&self) -> Option<&AuthSpec> {
        self.auth.as_ref()
    }

    /// Returns the caller-supplied middlewares in registration order.
    #[must_use]
    pub fn middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.middlewares
    }

    /// Returns whether the logging middleware is enabled.
    #[must_use]
    pub const fn log_enabled(&self) -> bool {
        self.log_enabled
    }

    /// Returns the transport-level retry settings.
    #[must_use]
    pub const fn http_retry(&self) -> &HttpRetryConfig {
        &self.http_retry
    }

    /// Returns the version-conflict retry settings.
    #[must_use]
    pub const fn conflict_retry(&self) -> &ConflictRetryConfig {
        &self.conflict_retry
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the caller-supplied `reqwest` client, if any.
    #[must_use]
    pub const fn http_client(&self) -> Option<&reqwest::Client> {
        self.http_client.as_ref()
    }

    /// Returns the environment source used for credential fallback.
    #[must_use]
    pub fn env(&self) -> &dyn EnvSource {
        self.env.as_ref()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("project_key", &self.project_key)
            .field("auth", &self.auth)
            .field("middlewares", &self.middlewares.len())
            .field("log_enabled", &self.log_enabled)
            .field("http_retry", &self.http_retry)
            .field("conflict_retry", &self.conflict_retry)
            .field("user_agent_prefix", &self.user_agent_prefix)
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// No field is strictly required: `host` and `project_key` fall back to the
/// environment, and a missing `auth` means client credentials come from the
/// environment when the client is first used.
///
/// # Defaults
///
/// - `log_enabled`: `false`
/// - `middlewares`: none
/// - `http_retry`: 2 retries, 300 ms initial delay, 5 s ceiling
/// - `conflict_retry`: 3 attempts, 200 ms initial delay, 5 s ceiling
#[derive(Default)]
pub struct ClientConfigBuilder {
    host: Option<ApiUrl>,
    project_key: Option<ProjectKey>,
    auth: Option<AuthSpec>,
    middlewares: Vec<Arc<dyn Middleware>>,
    log_enabled: bool,
    http_retry: Option<HttpRetryConfig>,
    conflict_retry: Option<ConflictRetryConfig>,
    user_agent_prefix: Option<String>,
    http_client: Option<reqwest::Client>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API host.
    #[must_use]
    pub fn host(mut self, host: ApiUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the project key.
    #[must_use]
    pub fn project_key(mut self, key: ProjectKey) -> Self {
        self.project_key = Some(key);
        self
    }

    /// Sets how requests are authenticated.
    #[must_use]
    pub fn auth(mut self, auth: AuthSpec) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Appends a caller middleware. Middlewares run in registration order.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared caller middleware.
    #[must_use]
    pub fn shared_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Enables or disables the request logging middleware.
    #[must_use]
    pub const fn log_enabled(mut self, enabled: bool) -> Self {
        self.log_enabled = enabled;
        self
    }

    /// Sets the transport-level retry settings.
    #[must_use]
    pub const fn http_retry(mut self, retry: HttpRetryConfig) -> Self {
        self.http_retry = Some(retry);
        self
    }

    /// Sets the version-conflict retry settings.
    #[must_use]
    pub const fn conflict_retry(mut self, retry: ConflictRetryConfig) -> Self {
        self.conflict_retry = Some(retry);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Uses the given `reqwest` client for all API and token requests.
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the [`ClientConfig`], reading missing values from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `host` or `project_key` are
    /// unset and absent from the environment, or a validation error if the
    /// environment value is malformed.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        self.build_with_env(ProcessEnv)
    }

    /// Builds the [`ClientConfig`], reading missing values from `env`.
    ///
    /// The same source is kept for resolving auth credentials later.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_with_env(self, env: impl EnvSource + 'static) -> Result<ClientConfig, ConfigError> {
        let env: Arc<dyn EnvSource> = Arc::new(env);

        let host = match self.host {
            Some(host) => host,
            None => ApiUrl::new(require_env_property(env.as_ref(), "API_URL")?)?,
        };
        let project_key = match self.project_key {
            Some(key) => key,
            None => ProjectKey::new(require_env_property(env.as_ref(), "PROJECT_KEY")?)?,
        };

        Ok(ClientConfig {
            host,
            project_key,
            auth: self.auth,
            middlewares: self.middlewares,
            log_enabled: self.log_enabled,
            http_retry: self.http_retry.unwrap_or_default(),
            conflict_retry: self.conflict_retry.unwrap_or_default(),
            user_agent_prefix: self.user_agent_prefix,
            http_client: self.http_client,
            env,
        })
    }
}
