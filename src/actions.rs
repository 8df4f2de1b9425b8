//! Typed getters for common resources.
//!
//! # Overview
//!
//! - [`ResourceGetter`]: fetches one resource type by ID
//! - [`CtActions`]: getters using the server-scoped client
//! - [`TokenScopedCtActions`]: getters using a customer's own token, so only
//!   that customer's orders and payments are reachable
//!
//! # Example
//!
//! ```rust,ignore
//! use commercetools_client::QueryArgs;
//!
//! let actions = client.actions().await?;
//! let order = actions
//!     .orders
//!     .get_order_by_order_number("10001", &QueryArgs::new())
//!     .await?;
//!
//! let mine = client.token_scoped_actions(customer_token);
//! let payment = mine.payments.get_my_payment("p-1", &QueryArgs::new()).await?;
//! ```

use serde::de::DeserializeOwned;

use crate::api::{ProjectApi, ResourceEndpoint};
use crate::clients::{HttpError, QueryArgs};

/// Fetches resources of one type by ID, returning the response body.
#[derive(Clone, Debug)]
pub struct ResourceGetter {
    endpoint: ResourceEndpoint,
}

impl ResourceGetter {
    /// Creates a getter for `resource` (e.g. `"orders"`) under `api`.
    #[must_use]
    pub fn new(api: &ProjectApi, resource: &str) -> Self {
        Self {
            endpoint: api.resource(resource),
        }
    }

    /// Fetches the resource with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn get(&self, id: &str, args: &QueryArgs) -> Result<serde_json::Value, HttpError> {
        let response = self.endpoint.with_id(id).get(args).await?;
        Ok(response.body)
    }

    /// Fetches the resource with `id` and decodes it as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Decode`] if the body does not match `T`, or any
    /// error from [`get`](Self::get).
    pub async fn get_as<T: DeserializeOwned>(&self, id: &str, args: &QueryArgs) -> Result<T, HttpError> {
        let body = self.get(id, args).await?;
        Ok(serde_json::from_value(body)?)
    }
}

/// Payment getters.
#[derive(Clone, Debug)]
pub struct PaymentActions {
    payments: ResourceGetter,
}

impl PaymentActions {
    fn new(api: &ProjectApi) -> Self {
        Self {
            payments: ResourceGetter::new(api, "payments"),
        }
    }

    /// Fetches a payment by ID.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn get_my_payment(&self, id: &str, args: &QueryArgs) -> Result<serde_json::Value, HttpError> {
        self.payments.get(id, args).await
    }
}

/// Order getters available to any token.
#[derive(Clone, Debug)]
pub struct MyOrderActions {
    orders: ResourceGetter,
}

impl MyOrderActions {
    fn new(api: &ProjectApi) -> Self {
        Self {
            orders: ResourceGetter::new(api, "orders"),
        }
    }

    /// Fetches an order by ID.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn get_my_order(&self, id: &str, args: &QueryArgs) -> Result<serde_json::Value, HttpError> {
        self.orders.get(id, args).await
    }
}

/// Order getters for the server-scoped client.
#[derive(Clone, Debug)]
pub struct OrderActions {
    mine: MyOrderActions,
    orders: ResourceEndpoint,
}

impl OrderActions {
    fn new(api: &ProjectApi) -> Self {
        Self {
            mine: MyOrderActions::new(api),
            orders: api.orders(),
        }
    }

    /// Fetches an order by ID.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn get_my_order(&self, id: &str, args: &QueryArgs) -> Result<serde_json::Value, HttpError> {
        self.mine.get_my_order(id, args).await
    }

    /// Fetches an order by its order number.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn get_order_by_order_number(
        &self,
        order_number: &str,
        args: &QueryArgs,
    ) -> Result<serde_json::Value, HttpError> {
        let response = self.orders.with_order_number(order_number).get(args).await?;
        Ok(response.body)
    }
}

/// Getters using the client's own credentials.
#[derive(Clone, Debug)]
pub struct CtActions {
    /// Payment getters.
    pub payments: PaymentActions,
    /// Order getters.
    pub orders: OrderActions,
}

impl CtActions {
    /// Creates the getters for `api`.
    #[must_use]
    pub fn new(api: &ProjectApi) -> Self {
        Self {
            payments: PaymentActions::new(api),
            orders: OrderActions::new(api),
        }
    }
}

/// Getters using a customer's token, rooted at `/{project}/me`.
#[derive(Clone, Debug)]
pub struct TokenScopedCtActions {
    /// Payment getters.
    pub payments: PaymentActions,
    /// Order getters.
    pub orders: MyOrderActions,
}

impl TokenScopedCtActions {
    /// Creates the getters for `me`, which should already be rooted at `/me`.
    #[must_use]
    pub fn new(me: &ProjectApi) -> Self {
        Self {
            payments: PaymentActions::new(me),
            orders: MyOrderActions::new(me),
        }
    }
}
