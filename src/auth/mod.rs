//! Authentication for the commercetools API.
//!
//! # Overview
//!
//! - [`AuthSpec`]: how a client should authenticate, as configured
//! - [`AuthStrategy`]: the concrete strategy a built client uses
//! - [`resolve_auth`]: turns the former into the latter, with environment fallback
//! - [`ClientCredentialsFlow`]: OAuth 2.0 client-credentials token source
//! - [`Scopes`]: the scopes requested from the auth service
//!
//! # Strategies
//!
//! A static token (or a callback returning one) is sent as-is on every
//! request and never refreshed. Client credentials are exchanged for an
//! access token on first use, and again when that token nears expiry.
//!
//! # Example
//!
//! ```rust,ignore
//! use commercetools_client::auth::{resolve_auth, AuthSpec};
//! use commercetools_client::config::ProcessEnv;
//!
//! let strategy = resolve_auth(Some(&AuthSpec::token("abc")), &ProcessEnv, &reqwest::Client::new()).await?;
//! assert_eq!(strategy.authorization().await?, "Bearer abc");
//! ```

mod client_credentials;
mod error;
mod resolver;
mod scopes;
mod spec;

pub use client_credentials::ClientCredentialsFlow;
pub use error::AuthError;
pub use resolver::{
    existing_token, normalize_bearer, populate_credentials, resolve_auth, AuthStrategy,
    PopulatedCredentials,
};
pub use scopes::Scopes;
pub use spec::{AuthResolver, AuthResolverFuture, AuthSpec, CredentialsSpec, ResolvedAuth};
