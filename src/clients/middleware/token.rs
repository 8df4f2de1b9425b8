use async_trait::async_trait;

use crate::auth::AuthStrategy;
use crate::clients::cache::CacheInvalidator;
use crate::clients::errors::HttpError;
use crate::clients::middleware::{Exchange, Middleware, Next};

/// Reacts to `invalid_token` responses.
///
/// The strategy forgets its fetched token and the cached client is
/// invalidated. The response continues down the chain either way; the next
/// request through this pipeline fetches a new token, and the next call
/// through the cache builds a fresh client.
#[derive(Debug)]
pub struct TokenInvalidMiddleware {
    strategy: AuthStrategy,
    invalidator: Option<CacheInvalidator>,
}

impl TokenInvalidMiddleware {
    /// Creates the middleware. Without an invalidator, no cache is touched.
    #[must_use]
    pub const fn new(strategy: AuthStrategy, invalidator: Option<CacheInvalidator>) -> Self {
        Self {
            strategy,
            invalidator,
        }
    }
}

#[async_trait]
impl Middleware for TokenInvalidMiddleware {
    async fn dispatch(&self, exchange: Exchange, next: Next<'_>) -> Result<Exchange, HttpError> {
        if exchange
            .response
            .as_ref()
            .is_some_and(crate::clients::HttpResponse::is_token_invalid)
        {
            self.strategy.reset().await;
            match &self.invalidator {
                Some(invalidator) => {
                    if invalidator.invalidate().await {
                        tracing::debug!(
                            "Access token rejected on {}, cached client invalidated",
                            exchange.request.path
                        );
                    }
                }
                None => tracing::debug!("Access token rejected on {}", exchange.request.path),
            }
        }
        next.run(exchange).await
    }
}
