//! Response classification.
//!
//! Every response leaving the pipeline is classified exactly once:
//!
//! | Status | Classification | When it surfaces |
//! |---|---|---|
//! | 2xx | [`Classification::Ok`] | returned to the caller |
//! | 409 | [`Classification::Conflict`] | after the chain |
//! | other 4xx | [`Classification::ApiError`] | after the chain |
//! | anything else | [`Classification::ApiError`] | immediately, aborting the chain |

use crate::clients::errors::{ApiError, ConflictError};
use crate::clients::http_response::HttpResponse;

/// Status used by the API for optimistic-concurrency conflicts.
pub const CONFLICT_STATUS: u16 = 409;

/// The outcome of classifying a response.
#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    /// A successful response.
    Ok,
    /// A failed response.
    ApiError(ApiError),
    /// A version conflict.
    Conflict(ConflictError),
}

/// Classifies `response`.
///
/// # Example
///
/// ```rust
/// use commercetools_client::clients::{classify, Classification, HttpResponse};
/// use std::collections::HashMap;
///
/// let response = HttpResponse::new(
///     409,
///     HashMap::new(),
///     serde_json::json!({"statusCode": 409, "message": "Version mismatch", "errors": [{"code": "ConcurrentModification", "currentVersion": 4}]}),
/// );
///
/// match classify(&response) {
///     Classification::Conflict(conflict) => assert_eq!(conflict.current_version, Some(4)),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[must_use]
pub fn classify(response: &HttpResponse) -> Classification {
    let Some(error) = &response.error else {
        return Classification::Ok;
    };

    if response.code == CONFLICT_STATUS {
        Classification::Conflict(ConflictError::from_response(response, error))
    } else {
        Classification::ApiError(ApiError::from_response(response, error))
    }
}

/// Returns `true` if `code` aborts the chain as soon as it is seen.
///
/// Client errors in `[400, 500)` are left for later middlewares to observe.
#[must_use]
pub const fn is_fatal_status(code: u16) -> bool {
    !(code >= 400 && code < 500)
}
