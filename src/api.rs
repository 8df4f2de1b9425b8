//! Request builders for the commercetools HTTP API.
//!
//! # Overview
//!
//! Paths are built up step by step, mirroring the API's URL structure:
//!
//! ```text
//! ApiRoot ──with_project_key──▶ ProjectApi ──orders()──▶ ResourceEndpoint ──with_id()──▶ ItemEndpoint
//!                                   │                        /{project}/orders            /{project}/orders/{id}
//!                                   └──me()──▶ ProjectApi (/{project}/me)
//! ```
//!
//! Every terminal call sends its request through the client's [`Pipeline`].
//! Updates (`ItemEndpoint::post`) are retried on version conflicts.
//!
//! # Example
//!
//! ```rust,ignore
//! use commercetools_client::QueryArgs;
//! use serde_json::json;
//!
//! let project = client.project_api().await?;
//!
//! let order = project
//!     .orders()
//!     .with_id("a0b1c2")
//!     .get(&QueryArgs::new().expand("paymentInfo.payments[*]"))
//!     .await?;
//!
//! project
//!     .orders()
//!     .with_id("a0b1c2")
//!     .post(json!({
//!         "version": order.body["version"],
//!         "actions": [{"action": "changeOrderState", "orderState": "Complete"}]
//!     }))
//!     .await?;
//! ```

use std::sync::Arc;

use crate::clients::{HttpError, HttpMethod, HttpRequest, HttpResponse, Pipeline, QueryArgs};
use crate::config::ProjectKey;

/// The entry point of a built client.
///
/// Cloning is cheap; clones share the pipeline.
#[derive(Clone, Debug)]
pub struct ApiRoot {
    pipeline: Arc<Pipeline>,
}

impl ApiRoot {
    /// Wraps a pipeline.
    #[must_use]
    pub const fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Scopes requests to a project.
    #[must_use]
    pub fn with_project_key(&self, key: &ProjectKey) -> ProjectApi {
        ProjectApi {
            pipeline: Arc::clone(&self.pipeline),
            base: encode_segment(key.as_ref()),
        }
    }

    /// Returns the pipeline requests are sent through.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Returns `true` if both roots share the same pipeline, i.e. come from
    /// the same client build.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pipeline, &other.pipeline)
    }
}

/// Requests scoped to one project (or to `/me` within it).
#[derive(Clone, Debug)]
pub struct ProjectApi {
    pipeline: Arc<Pipeline>,
    base: String,
}

impl ProjectApi {
    /// Returns the path prefix, e.g. `my-project` or `my-project/me`.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base
    }

    /// The `orders` endpoint.
    #[must_use]
    pub fn orders(&self) -> ResourceEndpoint {
        self.resource("orders")
    }

    /// The `payments` endpoint.
    #[must_use]
    pub fn payments(&self) -> ResourceEndpoint {
        self.resource("payments")
    }

    /// The `products` endpoint.
    #[must_use]
    pub fn products(&self) -> ResourceEndpoint {
        self.resource("products")
    }

    /// The `customers` endpoint.
    #[must_use]
    pub fn customers(&self) -> ResourceEndpoint {
        self.resource("customers")
    }

    /// The `carts` endpoint.
    #[must_use]
    pub fn carts(&self) -> ResourceEndpoint {
        self.resource("carts")
    }

    /// Any other endpoint, by its path segment (e.g. `shopping-lists`).
    #[must_use]
    pub fn resource(&self, name: &str) -> ResourceEndpoint {
        ResourceEndpoint {
            pipeline: Arc::clone(&self.pipeline),
            path: format!("{}/{}", self.base, encode_segment(name)),
        }
    }

    /// The same project, rooted at `/me` for customer-token requests.
    #[must_use]
    pub fn me(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            base: format!("{}/me", self.base),
        }
    }

    /// Fetches the project (or, under `/me`, the current customer).
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn get(&self, args: &QueryArgs) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Get, self.base.clone())
            .query(args)
            .build()?;
        self.pipeline.execute(request).await
    }
}

/// A resource collection such as `/{project}/orders`.
#[derive(Clone, Debug)]
pub struct ResourceEndpoint {
    pipeline: Arc<Pipeline>,
    path: String,
}

impl ResourceEndpoint {
    /// Returns the collection path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Queries the collection.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn get(&self, args: &QueryArgs) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Get, self.path.clone())
            .query(args)
            .build()?;
        self.pipeline.execute(request).await
    }

    /// Creates a resource from a draft.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn post(&self, draft: serde_json::Value) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Post, self.path.clone())
            .body(draft)
            .build()?;
        self.pipeline.execute(request).await
    }

    /// A single resource by ID.
    #[must_use]
    pub fn with_id(&self, id: &str) -> ItemEndpoint {
        self.item(encode_segment(id))
    }

    /// A single resource by user-defined key.
    #[must_use]
    pub fn with_key(&self, key: &str) -> ItemEndpoint {
        self.item(format!("key={}", encode_segment(key)))
    }

    /// A single order by order number.
    #[must_use]
    pub fn with_order_number(&self, order_number: &str) -> ItemEndpoint {
        self.item(format!("order-number={}", encode_segment(order_number)))
    }

    fn item(&self, segment: String) -> ItemEndpoint {
        ItemEndpoint {
            pipeline: Arc::clone(&self.pipeline),
            path: format!("{}/{segment}", self.path),
        }
    }
}

/// A single resource such as `/{project}/orders/{id}`.
#[derive(Clone, Debug)]
pub struct ItemEndpoint {
    pipeline: Arc<Pipeline>,
    path: String,
}

impl ItemEndpoint {
    /// Returns the resource path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fetches the resource.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn get(&self, args: &QueryArgs) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Get, self.path.clone())
            .query(args)
            .build()?;
        self.pipeline.execute(request).await
    }

    /// Applies update actions. `update` carries `version` and `actions`.
    ///
    /// Version conflicts are retried with the server's current version.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails, including
    /// [`HttpError::RetryExhausted`] when every attempt conflicted.
    pub async fn post(&self, update: serde_json::Value) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Post, self.path.clone())
            .body(update)
            .build()?;
        self.pipeline.execute_with_conflict_retry(request).await
    }

    /// Deletes the resource at `version`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn delete(&self, version: i64) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Delete, self.path.clone())
            .query_param("version", version.to_string())
            .build()?;
        self.pipeline.execute(request).await
    }
}

fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
