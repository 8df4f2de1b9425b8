//! Turns an [`AuthSpec`] into a concrete [`AuthStrategy`].
//!
//! Resolution happens once per client build:
//!
//! 1. A callback spec is awaited exactly once; its result is resolved as if
//!    it had been configured directly.
//! 2. A token becomes a forced [`AuthStrategy::ExistingToken`], prefixed with
//!    `Bearer ` if needed. It is never refreshed.
//! 3. Credentials (or no spec at all) become a client-credentials flow, with
//!    missing fields read from `CT_AUTH_URL`, `CT_CLIENT_ID`,
//!    `CT_CLIENT_SECRET` and `CT_SCOPES`.

use std::sync::Arc;

use crate::auth::spec::{AuthSpec, CredentialsSpec, ResolvedAuth};
use crate::auth::{AuthError, ClientCredentialsFlow, Scopes};
use crate::config::{env_property, require_env_property, ApiUrl, ClientId, ClientSecret, EnvSource};
use crate::error::ConfigError;

const BEARER_PREFIX: &str = "Bearer ";

/// A concrete way of authenticating requests.
#[derive(Clone, Debug)]
pub enum AuthStrategy {
    /// A fixed `Authorization` header value.
    ExistingToken {
        /// The full header value, including the `Bearer ` prefix.
        authorization: String,
    },
    /// Tokens obtained through the client-credentials flow.
    ClientCredentials(Arc<ClientCredentialsFlow>),
}

impl AuthStrategy {
    /// Returns the `Authorization` header value for the next request.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if a token has to be fetched and the fetch fails.
    pub async fn authorization(&self) -> Result<String, AuthError> {
        match self {
            Self::ExistingToken { authorization } => Ok(authorization.clone()),
            Self::ClientCredentials(flow) => flow.authorization().await,
        }
    }

    /// Forgets any fetched token so the next request obtains a new one.
    /// A fixed token is left alone.
    pub async fn reset(&self) {
        if let Self::ClientCredentials(flow) = self {
            flow.clear().await;
        }
    }
}

/// Client-credentials settings after environment fallback.
#[derive(Debug, PartialEq, Eq)]
pub struct PopulatedCredentials {
    /// The auth service host.
    pub host: ApiUrl,
    /// The OAuth client ID.
    pub client_id: ClientId,
    /// The OAuth client secret.
    pub client_secret: ClientSecret,
    /// The requested scopes. Empty means "whatever the client is granted".
    pub scopes: Scopes,
}

/// Resolves `spec` into a strategy.
///
/// # Errors
///
/// Returns [`ConfigError`] when client credentials are incomplete after the
/// environment fallback.
pub async fn resolve_auth(
    spec: Option<&AuthSpec>,
    env: &dyn EnvSource,
    http: &reqwest::Client,
) -> Result<AuthStrategy, ConfigError> {
    let resolved = match spec {
        None => None,
        Some(AuthSpec::Token(token)) => Some(ResolvedAuth::Token(token.clone())),
        Some(AuthSpec::Credentials(credentials)) => {
            Some(ResolvedAuth::Credentials(credentials.clone()))
        }
        Some(AuthSpec::Resolver(resolver)) => resolver.call().await,
    };

    match resolved {
        Some(ResolvedAuth::Token(token)) => Ok(existing_token(&token)),
        Some(ResolvedAuth::Credentials(credentials)) => {
            client_credentials(Some(&credentials), env, http)
        }
        None => client_credentials(None, env, http),
    }
}

/// Builds a forced token strategy for a customer or pre-issued token.
#[must_use]
pub fn existing_token(token: &str) -> AuthStrategy {
    AuthStrategy::ExistingToken {
        authorization: normalize_bearer(token),
    }
}

/// Prefixes `token` with `Bearer ` unless it already is.
#[must_use]
pub fn normalize_bearer(token: &str) -> String {
    if token.starts_with(BEARER_PREFIX) {
        token.to_string()
    } else {
        format!("{BEARER_PREFIX}{token}")
    }
}

fn client_credentials(
    spec: Option<&CredentialsSpec>,
    env: &dyn EnvSource,
    http: &reqwest::Client,
) -> Result<AuthStrategy, ConfigError> {
    let credentials = populate_credentials(spec, env)?;
    let flow = ClientCredentialsFlow::new(
        http.clone(),
        &credentials.host,
        credentials.client_id,
        credentials.client_secret,
        credentials.scopes,
    );
    Ok(AuthStrategy::ClientCredentials(Arc::new(flow)))
}

/// Fills missing credential fields from the environment.
///
/// # Errors
///
/// - [`ConfigError::MissingCredential`] if the client ID or secret is absent
/// - [`ConfigError::MissingEnvVar`] if the auth host is absent
/// - a validation error if a value is malformed
pub fn populate_credentials(
    spec: Option<&CredentialsSpec>,
    env: &dyn EnvSource,
) -> Result<PopulatedCredentials, ConfigError> {
    let client_id = non_empty(spec.and_then(|s| s.client_id.as_ref()))
        .or_else(|| env_property(env, "CLIENT_ID"))
        .ok_or(ConfigError::MissingCredential { field: "client_id" })?;
    let client_secret = non_empty(spec.and_then(|s| s.client_secret.as_ref()))
        .or_else(|| env_property(env, "CLIENT_SECRET"))
        .ok_or(ConfigError::MissingCredential {
            field: "client_secret",
        })?;
    let host = match non_empty(spec.and_then(|s| s.host.as_ref())) {
        Some(host) => host,
        None => require_env_property(env, "AUTH_URL")?,
    };
    let scopes = match spec.and_then(|s| s.scopes.clone()) {
        Some(scopes) => scopes,
        None => env_property(env, "SCOPES")
            .map(|s| s.parse::<Scopes>())
            .transpose()?
            .unwrap_or_default(),
    };

    Ok(PopulatedCredentials {
        host: ApiUrl::new(host)?,
        client_id: ClientId::new(client_id)?,
        client_secret: ClientSecret::new(client_secret)?,
        scopes,
    })
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn full_credentials() -> CredentialsSpec {
        CredentialsSpec::new()
            .host("https://auth.europe-west1.gcp.commercetools.com/")
            .client_id("my-client-id")
            .client_secret("my-client-secret")
            .scopes(Scopes::from(vec![
                "view_orders:my-project".to_string(),
                "view_products:my-project".to_string(),
            ]))
    }

    #[test]
    fn test_normalize_bearer_adds_prefix_once() {
        assert_eq!(normalize_bearer("foo"), "Bearer foo");
        assert_eq!(normalize_bearer("Bearer foo"), "Bearer foo");
    }

    #[test]
    fn test_complete_credentials_ignore_environment() {
        let populated = populate_credentials(Some(&full_credentials()), &HashMap::new()).unwrap();

        assert_eq!(populated.host.as_ref(), "https://auth.europe-west1.gcp.commercetools.com");
        assert_eq!(populated.client_id.as_ref(), "my-client-id");
        assert_eq!(populated.scopes.len(), 2);
    }

    #[test]
    fn test_partial_credentials_fill_from_environment() {
        let spec = CredentialsSpec::new().client_id("explicit-id");
        let env = env(&[
            ("CT_AUTH_URL", "https://auth.example.com"),
            ("CT_CLIENT_ID", "env-id"),
            ("CTP_CLIENT_SECRET", "env-secret"),
            ("CT_SCOPES", "view_orders:p, view_products:p"),
        ]);

        let populated = populate_credentials(Some(&spec), &env).unwrap();

        assert_eq!(populated.client_id.as_ref(), "explicit-id");
        assert_eq!(populated.client_secret.as_ref(), "env-secret");
        assert_eq!(
            populated.scopes.iter().collect::<Vec<_>>(),
            vec!["view_orders:p", "view_products:p"]
        );
    }

    #[test]
    fn test_missing_client_id_is_configuration_error() {
        let env = env(&[("CT_AUTH_URL", "https://auth.example.com"), ("CT_CLIENT_SECRET", "s")]);
        let result = populate_credentials(None, &env);
        assert_eq!(
            result,
            Err(ConfigError::MissingCredential { field: "client_id" })
        );
    }

    #[test]
    fn test_missing_client_secret_is_configuration_error() {
        let spec = CredentialsSpec::new()
            .client_id("id")
            .host("https://auth.example.com");
        let result = populate_credentials(Some(&spec), &HashMap::new());
        assert_eq!(
            result,
            Err(ConfigError::MissingCredential {
                field: "client_secret"
            })
        );
    }

    #[test]
    fn test_missing_auth_host_is_missing_env_var() {
        let spec = CredentialsSpec::new().client_id("id").client_secret("secret");
        let result = populate_credentials(Some(&spec), &HashMap::new());
        assert_eq!(result, Err(ConfigError::MissingEnvVar { key: "AUTH_URL" }));
    }

    #[test]
    fn test_missing_scopes_default_to_empty() {
        let spec = CredentialsSpec::new()
            .client_id("id")
            .client_secret("secret")
            .host("https://auth.example.com");
        let populated = populate_credentials(Some(&spec), &HashMap::new()).unwrap();
        assert!(populated.scopes.is_empty());
    }

    #[tokio::test]
    async fn test_token_spec_becomes_forced_bearer() {
        let strategy = resolve_auth(
            Some(&AuthSpec::token("abc")),
            &HashMap::new(),
            &reqwest::Client::new(),
        )
        .await
        .unwrap();

        assert_eq!(strategy.authorization().await.unwrap(), "Bearer abc");
    }

    #[tokio::test]
    async fn test_callback_is_invoked_once_per_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let spec = AuthSpec::resolver(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Some(ResolvedAuth::from("Bearer from-callback")) }
        });

        let strategy = resolve_auth(Some(&spec), &HashMap::new(), &reqwest::Client::new())
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            strategy.authorization().await.unwrap(),
            "Bearer from-callback"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_callback_returning_none_uses_environment_credentials() {
        let spec = AuthSpec::resolver(|| async { None });
        let env = env(&[
            ("CT_AUTH_URL", "https://auth.example.com"),
            ("CT_CLIENT_ID", "id"),
            ("CT_CLIENT_SECRET", "secret"),
        ]);

        let strategy = resolve_auth(Some(&spec), &env, &reqwest::Client::new())
            .await
            .unwrap();

        match strategy {
            AuthStrategy::ClientCredentials(flow) => {
                assert_eq!(flow.token_url(), "https://auth.example.com/oauth/token");
            }
            AuthStrategy::ExistingToken { .. } => panic!("Expected client credentials"),
        }
    }

    #[tokio::test]
    async fn test_callback_returning_incomplete_credentials_fails() {
        let spec = AuthSpec::resolver(|| async {
            Some(ResolvedAuth::from(CredentialsSpec::new().client_secret("s")))
        });

        let result = resolve_auth(Some(&spec), &HashMap::new(), &reqwest::Client::new()).await;

        assert!(matches!(
            result,
            Err(ConfigError::MissingCredential { field: "client_id" })
        ));
    }
}
