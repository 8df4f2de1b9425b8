//! Configuration error types for the commercetools client.
//!
//! Every configuration constructor returns `Result<T, ConfigError>` so that a
//! misconfigured client fails when it is built, never halfway through a
//! request.
//!
//! # Example
//!
//! ```rust
//! use commercetools_client::{ConfigError, ProjectKey};
//!
//! let result = ProjectKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyProjectKey)));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring or building a client.
///
/// These errors are fatal: they are raised at build time and are never
/// retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Missing env var CT_{key} / CTP_{key}")]
    MissingEnvVar {
        /// The variable name without its `CT_`/`CTP_` prefix.
        key: &'static str,
    },

    /// A client-credentials field is absent from both the config and the environment.
    #[error("commercetools {field} missing. Pass it in the auth config or set it in the environment.")]
    MissingCredential {
        /// The name of the missing credential field.
        field: &'static str,
    },

    /// Project key cannot be empty.
    #[error("Project key cannot be empty. Please provide a valid commercetools project key.")]
    EmptyProjectKey,

    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty.")]
    EmptyClientId,

    /// Client secret cannot be empty.
    #[error("Client secret cannot be empty.")]
    EmptyClientSecret,

    /// A URL is invalid.
    #[error("Invalid URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://api.europe-west1.gcp.commercetools.com').")]
    InvalidUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Scopes are invalid.
    #[error("Invalid scopes: {reason}")]
    InvalidScopes {
        /// The reason the scopes are invalid.
        reason: String,
    },
}
