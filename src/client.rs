//! The top-level client.
//!
//! [`CommercetoolsClient`] owns a [`ClientConfig`] and a [`ClientCache`].
//! Server-scoped calls go through the cached client; customer-scoped calls
//! build a fresh, uncached pipeline around the customer's token.

use std::sync::Arc;

use crate::actions::{CtActions, TokenScopedCtActions};
use crate::api::{ApiRoot, ProjectApi};
use crate::auth::existing_token;
use crate::clients::{system_clock, ClientCache, Clock, Pipeline};
use crate::config::{ClientConfig, EnvSource};
use crate::error::ConfigError;

/// A commercetools API client.
///
/// Construction is cheap and performs no I/O; auth is resolved and the
/// pipeline built on the first call that needs them.
///
/// # Example
///
/// ```rust,ignore
/// use commercetools_client::{ClientConfig, CommercetoolsClient, QueryArgs};
///
/// let client = CommercetoolsClient::new(ClientConfig::builder().build()?);
///
/// let project = client.project_api().await?;
/// let orders = project.orders().get(&QueryArgs::new().limit(10)).await?;
/// ```
#[derive(Debug)]
pub struct CommercetoolsClient {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
    cache: ClientCache,
}

// Verify CommercetoolsClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CommercetoolsClient>();
};

impl CommercetoolsClient {
    /// Creates a client from `config`.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    /// Creates a client entirely from environment variables in `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `API_URL` or `PROJECT_KEY`
    /// is absent.
    pub fn with_env(env: impl EnvSource + 'static) -> Result<Self, ConfigError> {
        Ok(Self::new(ClientConfig::builder().build_with_env(env)?))
    }

    /// Creates a client whose cache reads time from `clock`.
    #[must_use]
    pub fn with_clock(config: ClientConfig, clock: Clock) -> Self {
        let http = config.http_client().cloned().unwrap_or_default();
        let config = Arc::new(config);
        let cache = ClientCache::with_clock(Arc::clone(&config), http.clone(), clock);
        Self {
            config,
            http,
            cache,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the cached API root, building it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if auth cannot be resolved.
    pub async fn api_root(&self) -> Result<ApiRoot, ConfigError> {
        self.cache.get().await
    }

    /// Returns the cached API root scoped to the configured project.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if auth cannot be resolved.
    pub async fn project_api(&self) -> Result<ProjectApi, ConfigError> {
        Ok(self.api_root().await?.with_project_key(self.config.project_key()))
    }

    /// Drops the cached client.
    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    /// Returns `true` if a built client is cached.
    pub async fn is_cached(&self) -> bool {
        self.cache.is_cached().await
    }

    /// Returns a project API rooted at `/me` that authenticates with
    /// `customer_token`.
    ///
    /// The pipeline is built fresh for each call and never cached. The token
    /// is used as-is and never refreshed.
    #[must_use]
    pub fn customer_api(&self, customer_token: &str) -> ProjectApi {
        let pipeline = Pipeline::from_config(
            &self.config,
            self.http.clone(),
            existing_token(customer_token),
            None,
        );
        ApiRoot::new(Arc::new(pipeline))
            .with_project_key(self.config.project_key())
            .me()
    }

    /// Returns getters using the client's own credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if auth cannot be resolved.
    pub async fn actions(&self) -> Result<CtActions, ConfigError> {
        Ok(CtActions::new(&self.project_api().await?))
    }

    /// Returns getters scoped to the customer owning `customer_token`.
    #[must_use]
    pub fn token_scoped_actions(&self, customer_token: &str) -> TokenScopedCtActions {
        TokenScopedCtActions::new(&self.customer_api(customer_token))
    }
}
