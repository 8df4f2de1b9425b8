//! How a client is told to authenticate.
//!
//! An [`AuthSpec`] is stored in the configuration and is only turned into a
//! concrete strategy when the client is built, so async callbacks and
//! environment lookups happen lazily.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::Scopes;

/// Future returned by an auth callback.
pub type AuthResolverFuture = Pin<Box<dyn Future<Output = Option<ResolvedAuth>> + Send>>;

/// Authentication settings for a client.
///
/// # Example
///
/// ```rust
/// use commercetools_client::{AuthSpec, CredentialsSpec, ResolvedAuth};
///
/// // A pre-issued bearer token
/// let token = AuthSpec::token("abc");
///
/// // Client credentials, any missing field read from CT_* variables
/// let credentials = AuthSpec::Credentials(
///     CredentialsSpec::new()
///         .client_id("my-client-id")
///         .client_secret("my-client-secret"),
/// );
///
/// // A callback deciding at build time
/// let callback = AuthSpec::resolver(|| async { Some(ResolvedAuth::from("abc")) });
/// ```
#[derive(Clone)]
pub enum AuthSpec {
    /// A fixed bearer token. It is never refreshed.
    Token(String),
    /// Client-credentials flow settings.
    Credentials(CredentialsSpec),
    /// An async callback invoked once per client build.
    Resolver(AuthResolver),
}

impl AuthSpec {
    /// Creates a static token spec.
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }

    /// Creates a spec from an async callback.
    ///
    /// Returning `None` from the callback means "read client credentials
    /// from the environment".
    pub fn resolver<F, Fut>(callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<ResolvedAuth>> + Send + 'static,
    {
        Self::Resolver(AuthResolver(Arc::new(move || Box::pin(callback()))))
    }
}

impl fmt::Debug for AuthSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("AuthSpec::Token(*****)"),
            Self::Credentials(c) => f.debug_tuple("AuthSpec::Credentials").field(c).finish(),
            Self::Resolver(_) => f.write_str("AuthSpec::Resolver(..)"),
        }
    }
}

/// A shared async auth callback.
#[derive(Clone)]
pub struct AuthResolver(Arc<dyn Fn() -> AuthResolverFuture + Send + Sync>);

impl AuthResolver {
    /// Invokes the callback.
    pub async fn call(&self) -> Option<ResolvedAuth> {
        (self.0)().await
    }
}

/// The outcome of an auth callback.
#[derive(Clone)]
pub enum ResolvedAuth {
    /// A bearer token, with or without the `Bearer ` prefix.
    Token(String),
    /// Client-credentials settings.
    Credentials(CredentialsSpec),
}

impl From<&str> for ResolvedAuth {
    fn from(token: &str) -> Self {
        Self::Token(token.to_string())
    }
}

impl From<String> for ResolvedAuth {
    fn from(token: String) -> Self {
        Self::Token(token)
    }
}

impl From<CredentialsSpec> for ResolvedAuth {
    fn from(credentials: CredentialsSpec) -> Self {
        Self::Credentials(credentials)
    }
}

impl fmt::Debug for ResolvedAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("ResolvedAuth::Token(*****)"),
            Self::Credentials(c) => f.debug_tuple("ResolvedAuth::Credentials").field(c).finish(),
        }
    }
}

/// Client-credentials settings. Every field is optional and falls back to
/// the environment at build time.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialsSpec {
    pub(crate) host: Option<String>,
    pub(crate) client_id: Option<String>,
    pub(crate) client_secret: Option<String>,
    pub(crate) scopes: Option<Scopes>,
}

impl CredentialsSpec {
    /// Creates an empty spec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the auth host (e.g. `https://auth.europe-west1.gcp.commercetools.com`).
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the client ID.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the client secret.
    #[must_use]
    pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets the requested scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: impl Into<Scopes>) -> Self {
        self.scopes = Some(scopes.into());
        self
    }
}

impl fmt::Debug for CredentialsSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsSpec")
            .field("host", &self.host)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "*****"))
            .field("scopes", &self.scopes)
            .finish()
    }
}

// Verify AuthSpec is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthSpec>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_masks_token_and_secret() {
        let token = AuthSpec::token("very-secret-token");
        assert!(!format!("{token:?}").contains("very-secret-token"));

        let credentials = AuthSpec::Credentials(
            CredentialsSpec::new()
                .client_id("id")
                .client_secret("very-secret"),
        );
        let debug = format!("{credentials:?}");
        assert!(debug.contains("id"));
        assert!(!debug.contains("very-secret"));
    }

    #[tokio::test]
    async fn test_resolver_invokes_callback() {
        let spec = AuthSpec::resolver(|| async { Some(ResolvedAuth::from("abc")) });
        let AuthSpec::Resolver(resolver) = spec else {
            panic!("expected resolver");
        };
        assert!(matches!(resolver.call().await, Some(ResolvedAuth::Token(t)) if t == "abc"));
    }

    #[test]
    fn test_credentials_builder_sets_scopes() {
        let spec = CredentialsSpec::new().scopes(Scopes::from(vec!["a".to_string()]));
        assert_eq!(spec.scopes.map(|s| s.len()), Some(1));
    }
}
