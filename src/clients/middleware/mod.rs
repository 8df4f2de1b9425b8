//! The middleware chain every request runs through.
//!
//! # Overview
//!
//! A [`Middleware`] receives an [`Exchange`] (the request, and the response
//! once one exists) together with a [`Next`] handle for the rest of the chain.
//! It may inspect or modify the exchange, call [`Next::run`] to continue, or
//! return an error to abort.
//!
//! The built-in chain, in order:
//!
//! 1. [`AuthMiddleware`] sets the `Authorization` header
//! 2. [`TransportMiddleware`] sends the request and stores the response
//! 3. [`ErrorMiddleware`] aborts on fatal statuses
//! 4. [`TokenInvalidMiddleware`] invalidates the cached client on `invalid_token`
//! 5. caller middlewares, in registration order
//! 6. [`LoggerMiddleware`], when logging is enabled
//!
//! Caller middlewares therefore always see the response.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use commercetools_client::clients::{Exchange, HttpError, Middleware, Next};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct CountingMiddleware {
//!     calls: AtomicUsize,
//! }
//!
//! #[async_trait]
//! impl Middleware for CountingMiddleware {
//!     async fn dispatch(&self, exchange: Exchange, next: Next<'_>) -> Result<Exchange, HttpError> {
//!         self.calls.fetch_add(1, Ordering::SeqCst);
//!         next.run(exchange).await
//!     }
//! }
//! ```

mod auth;
mod error;
mod logger;
mod token;
mod transport;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::clients::errors::HttpError;
use crate::clients::http_request::HttpRequest;
use crate::clients::http_response::HttpResponse;

pub use auth::AuthMiddleware;
pub use error::ErrorMiddleware;
pub use logger::LoggerMiddleware;
pub use token::TokenInvalidMiddleware;
pub use transport::TransportMiddleware;

/// A request on its way through the chain.
#[derive(Clone, Debug)]
pub struct Exchange {
    /// The outgoing request.
    pub request: HttpRequest,
    /// The response, once the transport has produced one.
    pub response: Option<HttpResponse>,
    started_at: Instant,
}

impl Exchange {
    /// Starts an exchange for `request`.
    #[must_use]
    pub fn new(request: HttpRequest) -> Self {
        Self {
            request,
            response: None,
            started_at: Instant::now(),
        }
    }

    /// Returns when the exchange entered the chain.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }
}

/// A step in the request pipeline.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Handles `exchange`, usually by calling `next.run(exchange)`.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the chain; later middlewares do not run.
    async fn dispatch(&self, exchange: Exchange, next: Next<'_>) -> Result<Exchange, HttpError>;
}

/// The remainder of the chain after the current middleware.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    /// Wraps `chain` so that [`run`](Self::run) starts at its first middleware.
    #[must_use]
    pub const fn new(chain: &'a [Arc<dyn Middleware>]) -> Self {
        Self { chain }
    }

    /// Runs the rest of the chain. At the end of the chain the exchange is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Propagates the first error any remaining middleware returns.
    pub async fn run(self, exchange: Exchange) -> Result<Exchange, HttpError> {
        match self.chain.split_first() {
            Some((current, rest)) => current.dispatch(exchange, Next { chain: rest }).await,
            None => Ok(exchange),
        }
    }

    /// Returns the number of middlewares left.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.chain.len()
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.chain.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::http_request::HttpMethod;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Middleware for Recorder {
        async fn dispatch(&self, exchange: Exchange, next: Next<'_>) -> Result<Exchange, HttpError> {
            self.log.lock().unwrap().push(self.name);
            next.run(exchange).await
        }
    }

    struct Abort;

    #[async_trait]
    impl Middleware for Abort {
        async fn dispatch(&self, _exchange: Exchange, _next: Next<'_>) -> Result<Exchange, HttpError> {
            Err(HttpError::Aborted {
                reason: "stop".to_string(),
            })
        }
    }

    fn request() -> HttpRequest {
        HttpRequest::builder(HttpMethod::Get, "p/orders").build().unwrap()
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Recorder { name: "first", log: Arc::clone(&log) }),
            Arc::new(Recorder { name: "second", log: Arc::clone(&log) }),
        ];

        let exchange = Next::new(&chain).run(Exchange::new(request())).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
        assert!(exchange.response.is_none());
    }

    #[tokio::test]
    async fn test_error_aborts_remaining_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Recorder { name: "first", log: Arc::clone(&log) }),
            Arc::new(Abort),
            Arc::new(Recorder { name: "never", log: Arc::clone(&log) }),
        ];

        let result = Next::new(&chain).run(Exchange::new(request())).await;

        assert!(matches!(result, Err(HttpError::Aborted { .. })));
        assert_eq!(*log.lock().unwrap(), vec!["first"]);
    }

    #[tokio::test]
    async fn test_empty_chain_returns_exchange() {
        let chain: Vec<Arc<dyn Middleware>> = Vec::new();
        let next = Next::new(&chain);
        assert_eq!(next.remaining(), 0);
        let exchange = next.run(Exchange::new(request())).await.unwrap();
        assert_eq!(exchange.request.path, "p/orders");
    }
}
