use async_trait::async_trait;

use crate::auth::AuthStrategy;
use crate::clients::errors::HttpError;
use crate::clients::middleware::{Exchange, Middleware, Next};

/// Sets the `Authorization` header from the client's [`AuthStrategy`].
#[derive(Debug)]
pub struct AuthMiddleware {
    strategy: AuthStrategy,
}

impl AuthMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub const fn new(strategy: AuthStrategy) -> Self {
        Self { strategy }
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    async fn dispatch(&self, mut exchange: Exchange, next: Next<'_>) -> Result<Exchange, HttpError> {
        let authorization = self.strategy.authorization().await?;
        exchange.request.set_header("Authorization", authorization);
        next.run(exchange).await
    }
}
