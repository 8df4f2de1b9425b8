//! The assembled request pipeline.

use std::sync::Arc;

use crate::auth::AuthStrategy;
use crate::clients::cache::CacheInvalidator;
use crate::clients::classify::{classify, Classification};
use crate::clients::errors::HttpError;
use crate::clients::http_request::HttpRequest;
use crate::clients::http_response::HttpResponse;
use crate::clients::middleware::{
    AuthMiddleware, ErrorMiddleware, Exchange, LoggerMiddleware, Middleware, Next,
    TokenInvalidMiddleware, TransportMiddleware,
};
use crate::clients::retry::{retry_on_conflict, ConflictRetryConfig};
use crate::clients::transport::HttpTransport;
use crate::config::ClientConfig;

/// A middleware chain plus the conflict-retry policy for updates.
pub struct Pipeline {
    chain: Vec<Arc<dyn Middleware>>,
    conflict_retry: ConflictRetryConfig,
}

// Verify Pipeline is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Pipeline>();
};

impl Pipeline {
    /// Creates a pipeline from an explicit chain.
    #[must_use]
    pub fn new(chain: Vec<Arc<dyn Middleware>>, conflict_retry: ConflictRetryConfig) -> Self {
        Self {
            chain,
            conflict_retry,
        }
    }

    /// Assembles the standard chain for `config`.
    ///
    /// `invalidator` is present for cached clients so that an `invalid_token`
    /// response evicts them.
    #[must_use]
    pub fn from_config(
        config: &ClientConfig,
        http: reqwest::Client,
        strategy: AuthStrategy,
        invalidator: Option<CacheInvalidator>,
    ) -> Self {
        let transport = HttpTransport::new(
            http,
            config.host().clone(),
            *config.http_retry(),
            config.user_agent_prefix(),
        );

        let mut chain: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(AuthMiddleware::new(strategy.clone())),
            Arc::new(TransportMiddleware::new(transport)),
            Arc::new(ErrorMiddleware),
            Arc::new(TokenInvalidMiddleware::new(strategy, invalidator)),
        ];
        chain.extend(config.middlewares().iter().cloned());
        if config.log_enabled() {
            chain.push(Arc::new(LoggerMiddleware));
        }

        Self::new(chain, *config.conflict_retry())
    }

    /// Returns the number of middlewares in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns `true` if the chain has no middlewares.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Returns the conflict-retry policy.
    #[must_use]
    pub const fn conflict_retry(&self) -> &ConflictRetryConfig {
        &self.conflict_retry
    }

    /// Runs `request` through the chain and classifies the result.
    ///
    /// # Errors
    ///
    /// - [`HttpError::InvalidRequest`] if the request fails validation
    /// - [`HttpError::Api`] or [`HttpError::Conflict`] for non-2xx responses
    /// - [`HttpError::NoResponse`] if no middleware produced a response
    /// - any error a middleware aborted with
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;
        let path = request.path.clone();

        let exchange = Next::new(&self.chain).run(Exchange::new(request)).await?;
        let response = exchange.response.ok_or(HttpError::NoResponse { path })?;

        match classify(&response) {
            Classification::Ok => Ok(response),
            Classification::ApiError(e) => Err(e.into()),
            Classification::Conflict(e) => Err(e.into()),
        }
    }

    /// Like [`execute`](Self::execute), retrying version conflicts.
    ///
    /// # Errors
    ///
    /// See [`retry_on_conflict`].
    pub async fn execute_with_conflict_retry(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, HttpError> {
        retry_on_conflict(move |req| self.execute(req), request, &self.conflict_retry).await
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("middlewares", &self.chain.len())
            .field("conflict_retry", &self.conflict_retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::existing_token;
    use crate::clients::http_request::HttpMethod;
    use crate::config::{ApiUrl, ProjectKey};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct Respond(u16, serde_json::Value);

    #[async_trait]
    impl Middleware for Respond {
        async fn dispatch(&self, mut exchange: Exchange, next: Next<'_>) -> Result<Exchange, HttpError> {
            exchange.response = Some(HttpResponse::new(self.0, HashMap::new(), self.1.clone()));
            next.run(exchange).await
        }
    }

    fn get() -> HttpRequest {
        HttpRequest::builder(HttpMethod::Get, "p/orders/1").build().unwrap()
    }

    fn config(log_enabled: bool) -> ClientConfig {
        ClientConfig::builder()
            .host(ApiUrl::new("https://api.example.com").unwrap())
            .project_key(ProjectKey::new("p").unwrap())
            .log_enabled(log_enabled)
            .build_with_env(HashMap::new())
            .unwrap()
    }

    #[tokio::test]
    async fn test_execute_returns_success() {
        let pipeline = Pipeline::new(
            vec![Arc::new(Respond(200, serde_json::json!({"id": "1"})))],
            ConflictRetryConfig::default(),
        );
        let response = pipeline.execute(get()).await.unwrap();
        assert_eq!(response.body["id"], "1");
    }

    #[tokio::test]
    async fn test_execute_classifies_client_error_after_chain() {
        let pipeline = Pipeline::new(
            vec![
                Arc::new(Respond(404, serde_json::json!({"statusCode": 404, "message": "nope"}))),
                Arc::new(ErrorMiddleware),
            ],
            ConflictRetryConfig::default(),
        );
        let error = pipeline.execute(get()).await.unwrap_err();
        assert_eq!(error.to_string(), "404 (unknown) error: nope");
    }

    #[tokio::test]
    async fn test_execute_without_response_is_error() {
        let pipeline = Pipeline::new(Vec::new(), ConflictRetryConfig::default());
        let error = pipeline.execute(get()).await.unwrap_err();
        assert!(matches!(error, HttpError::NoResponse { path } if path == "p/orders/1"));
    }

    #[test]
    fn test_from_config_chain_length() {
        let http = reqwest::Client::new();
        let quiet = Pipeline::from_config(&config(false), http.clone(), existing_token("t"), None);
        let logged = Pipeline::from_config(&config(true), http, existing_token("t"), None);

        assert_eq!(quiet.len(), 4);
        assert_eq!(logged.len(), 5);
    }
}
