use async_trait::async_trait;

use crate::clients::classify::is_fatal_status;
use crate::clients::errors::{ApiError, HttpError};
use crate::clients::middleware::{Exchange, Middleware, Next};

/// Aborts the chain on responses outside `[400, 500)` that are not 2xx.
///
/// Client errors pass through so later middlewares can observe them; the
/// pipeline classifies them once the chain has finished.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorMiddleware;

#[async_trait]
impl Middleware for ErrorMiddleware {
    async fn dispatch(&self, exchange: Exchange, next: Next<'_>) -> Result<Exchange, HttpError> {
        if let Some(response) = &exchange.response {
            if let Some(error) = &response.error {
                if is_fatal_status(response.code) {
                    return Err(ApiError::from_response(response, error).into());
                }
            }
        }
        next.run(exchange).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::http_request::{HttpMethod, HttpRequest};
    use crate::clients::http_response::HttpResponse;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    #[async_trait]
    impl Middleware for Counter {
        async fn dispatch(&self, exchange: Exchange, next: Next<'_>) -> Result<Exchange, HttpError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            next.run(exchange).await
        }
    }

    fn exchange_with(code: u16) -> Exchange {
        let request = HttpRequest::builder(HttpMethod::Get, "p/orders/1")
            .build()
            .unwrap();
        let mut exchange = Exchange::new(request);
        exchange.response = Some(HttpResponse::new(
            code,
            HashMap::new(),
            serde_json::json!({"statusCode": code, "message": "failed"}),
        ));
        exchange
    }

    #[tokio::test]
    async fn test_server_error_aborts_chain() {
        let counter = Arc::new(Counter::default());
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(ErrorMiddleware), counter.clone()];

        let result = Next::new(&chain).run(exchange_with(500)).await;

        match result {
            Err(HttpError::Api(e)) => assert_eq!(e.to_string(), "500 (unknown) error: failed"),
            other => panic!("Expected Api error, got {other:?}"),
        }
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_client_error_flows_down_chain() {
        let counter = Arc::new(Counter::default());
        let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(ErrorMiddleware), counter.clone()];

        let exchange = Next::new(&chain).run(exchange_with(404)).await.unwrap();

        assert_eq!(exchange.response.unwrap().code, 404);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }
}
