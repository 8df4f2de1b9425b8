use async_trait::async_trait;

use crate::clients::errors::HttpError;
use crate::clients::middleware::{Exchange, Middleware, Next};
use crate::clients::transport::HttpTransport;

/// Sends the request and stores the response in the exchange.
#[derive(Debug)]
pub struct TransportMiddleware {
    transport: HttpTransport,
}

impl TransportMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub const fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Middleware for TransportMiddleware {
    async fn dispatch(&self, mut exchange: Exchange, next: Next<'_>) -> Result<Exchange, HttpError> {
        let response = self.transport.send(&exchange.request).await?;
        exchange.response = Some(response);
        next.run(exchange).await
    }
}
