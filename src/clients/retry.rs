//! Optimistic-concurrency retry.
//!
//! commercetools rejects an update whose `version` is stale with HTTP 409 and
//! reports the version it holds. [`retry_on_conflict`] re-issues such a
//! request with the reported version, backing off exponentially between
//! attempts.

use std::future::Future;
use std::time::Duration;

use crate::clients::errors::{HttpError, MalformedConflictError, MaxConflictRetriesExceededError};
use crate::clients::http_request::HttpRequest;
use crate::clients::http_response::HttpResponse;

/// Backoff settings for conflict retries.
///
/// # Example
///
/// ```rust
/// use commercetools_client::ConflictRetryConfig;
/// use std::time::Duration;
///
/// let config = ConflictRetryConfig::default();
/// assert_eq!(config.max_attempts, 3);
/// assert_eq!(config.delay_for_retry(0), Duration::from_millis(200));
/// assert_eq!(config.delay_for_retry(1), Duration::from_millis(400));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConflictRetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first conflict.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl ConflictRetryConfig {
    /// Returns the delay slept after conflict number `retry` (zero-based).
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.max_delay)
    }
}

impl Default for ConflictRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Runs `execute`, retrying version conflicts.
///
/// On [`HttpError::Conflict`] with attempts left, a request whose body carries
/// `version` is re-issued with the conflict's `current_version`; a body without
/// `version` is re-issued unchanged. Every other outcome is returned as-is.
///
/// With `max_attempts` of 1 the conflict itself is returned.
///
/// # Errors
///
/// - [`HttpError::MalformedConflict`] if a versioned request conflicts and the
///   server did not report its current version
/// - [`HttpError::RetryExhausted`] once all attempts conflicted
/// - any other error from `execute`
pub async fn retry_on_conflict<F, Fut>(
    mut execute: F,
    request: HttpRequest,
    config: &ConflictRetryConfig,
) -> Result<HttpResponse, HttpError>
where
    F: FnMut(HttpRequest) -> Fut,
    Fut: Future<Output = Result<HttpResponse, HttpError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut request = request;
    let mut attempt: u32 = 1;

    loop {
        let conflict = match execute(request.clone()).await {
            Err(HttpError::Conflict(conflict)) => conflict,
            other => return other,
        };

        if attempt >= max_attempts {
            if max_attempts == 1 {
                return Err(HttpError::Conflict(conflict));
            }
            return Err(MaxConflictRetriesExceededError {
                attempts: max_attempts,
                last: conflict,
            }
            .into());
        }

        if request.version().is_some() {
            let Some(current_version) = conflict.current_version else {
                return Err(MalformedConflictError { conflict }.into());
            };
            request.set_version(current_version);
        }

        let delay = config.delay_for_retry(attempt - 1);
        tracing::warn!(
            "Version conflict on {} (attempt {}/{}), retrying in {:?}",
            request.path,
            attempt,
            max_attempts,
            delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::errors::{ApiError, ConflictError};
    use crate::clients::http_request::HttpMethod;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn fast_config(max_attempts: u32) -> ConflictRetryConfig {
        ConflictRetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    fn update(version: i64) -> HttpRequest {
        HttpRequest::builder(HttpMethod::Post, "p/orders/1")
            .body(json!({"version": version, "actions": []}))
            .build()
            .unwrap()
    }

    fn conflict(current_version: Option<i64>) -> HttpError {
        HttpError::Conflict(ConflictError {
            status: 409,
            code: "ConcurrentModification".to_string(),
            message: "Version mismatch".to_string(),
            current_version,
            correlation_id: None,
        })
    }

    fn ok() -> HttpResponse {
        HttpResponse::new(200, HashMap::new(), json!({"id": "1"}))
    }

    #[test]
    fn test_delay_schedule_is_deterministic() {
        let config = ConflictRetryConfig {
            max_attempts: 10,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_millis(1000),
        };
        let delays: Vec<_> = (0..5).map(|n| config.delay_for_retry(n)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
                Duration::from_millis(1000),
                Duration::from_millis(1000),
            ]
        );
    }

    #[tokio::test]
    async fn test_success_returns_without_retry() {
        let calls = Mutex::new(0);
        let result = retry_on_conflict(
            |_| {
                *calls.lock().unwrap() += 1;
                async { Ok(ok()) }
            },
            update(3),
            &fast_config(3),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_conflict_is_retried_with_current_version() {
        let seen = Mutex::new(Vec::new());
        let result = retry_on_conflict(
            |request: HttpRequest| {
                let version = request.version();
                seen.lock().unwrap().push(version);
                async move {
                    if version == Some(4) {
                        Ok(ok())
                    } else {
                        Err(conflict(Some(4)))
                    }
                }
            },
            update(3),
            &fast_config(3),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(*seen.lock().unwrap(), vec![Some(3), Some(4)]);
    }

    #[tokio::test]
    async fn test_conflict_without_current_version_fails_fast() {
        let calls = Mutex::new(0);
        let result = retry_on_conflict(
            |_| {
                *calls.lock().unwrap() += 1;
                async { Err(conflict(None)) }
            },
            update(3),
            &fast_config(3),
        )
        .await;

        assert!(matches!(result, Err(HttpError::MalformedConflict(_))));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unversioned_body_is_retried_unchanged() {
        let bodies = Mutex::new(Vec::new());
        let request = HttpRequest::builder(HttpMethod::Post, "p/orders")
            .body(json!({"orderNumber": "1"}))
            .build()
            .unwrap();

        let result = retry_on_conflict(
            |request: HttpRequest| {
                let mut bodies = bodies.lock().unwrap();
                bodies.push(request.body);
                let attempt = bodies.len();
                async move {
                    if attempt == 2 {
                        Ok(ok())
                    } else {
                        Err(conflict(None))
                    }
                }
            },
            request,
            &fast_config(3),
        )
        .await;

        assert!(result.is_ok());
        let bodies = bodies.lock().unwrap();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0], bodies[1]);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_conflict() {
        let calls = Mutex::new(0);
        let result = retry_on_conflict(
            |_| {
                let attempt = {
                    let mut calls = calls.lock().unwrap();
                    *calls += 1;
                    *calls
                };
                async move { Err(conflict(Some(10 + attempt))) }
            },
            update(3),
            &fast_config(3),
        )
        .await;

        match result {
            Err(HttpError::RetryExhausted(e)) => {
                assert_eq!(e.attempts, 3);
                assert_eq!(e.last.current_version, Some(13));
            }
            other => panic!("Expected RetryExhausted, got {other:?}"),
        }
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_single_attempt_returns_conflict() {
        let result = retry_on_conflict(
            |_| async { Err(conflict(Some(4))) },
            update(3),
            &fast_config(1),
        )
        .await;

        assert!(matches!(result, Err(HttpError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = Mutex::new(0);
        let result = retry_on_conflict(
            |_| {
                *calls.lock().unwrap() += 1;
                async {
                    Err(HttpError::Api(ApiError {
                        status: 404,
                        code: "ResourceNotFound".to_string(),
                        message: "not found".to_string(),
                        token_invalid: false,
                        correlation_id: None,
                        body: json!({}),
                    }))
                }
            },
            update(3),
            &fast_config(3),
        )
        .await;

        assert!(matches!(result, Err(HttpError::Api(_))));
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
