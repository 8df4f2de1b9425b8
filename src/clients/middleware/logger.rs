use async_trait::async_trait;

use crate::clients::errors::HttpError;
use crate::clients::middleware::{Exchange, Middleware, Next};

/// Emits one `debug!` event per request that reaches it.
///
/// The logger runs last, so requests aborted earlier in the chain (network
/// failures, statuses outside 4xx) produce no event here; they surface as the
/// [`HttpError`] returned to the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggerMiddleware;

#[async_trait]
impl Middleware for LoggerMiddleware {
    async fn dispatch(&self, exchange: Exchange, next: Next<'_>) -> Result<Exchange, HttpError> {
        let status = exchange.response.as_ref().map(|r| r.code);
        tracing::debug!(
            method = %exchange.request.http_method,
            path = %exchange.request.path,
            status = ?status,
            elapsed = ?exchange.started_at().elapsed(),
            "commercetools request"
        );
        next.run(exchange).await
    }
}
