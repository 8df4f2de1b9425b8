//! OAuth 2.0 Client Credentials Grant against the commercetools auth service.
//!
//! The flow exchanges a client ID and secret for a short-lived access token:
//!
//! ```text
//! POST {auth_host}/oauth/token
//! Authorization: Basic base64(client_id:client_secret)
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=client_credentials&scope=view_orders:my-project
//! ```
//!
//! The token is cached inside the flow and re-requested shortly before it
//! expires, or as soon as the API rejects it with `invalid_token`.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::auth::{AuthError, Scopes};
use crate::config::{ApiUrl, ClientId, ClientSecret};

/// Grant type for client credentials.
const CLIENT_CREDENTIALS_GRANT_TYPE: &str = "client_credentials";

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_MARGIN_SECONDS: i64 = 300;

/// Successful response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// An access token with its expiry.
struct AccessToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map_or(true, |expires| now + Duration::seconds(EXPIRY_MARGIN_SECONDS) < expires)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"*****")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Client-credentials token source with an internal token cache.
#[derive(Debug)]
pub struct ClientCredentialsFlow {
    http: reqwest::Client,
    token_url: String,
    client_id: ClientId,
    client_secret: ClientSecret,
    scopes: Scopes,
    token: Mutex<Option<AccessToken>>,
}

impl ClientCredentialsFlow {
    /// Creates a flow against `auth_host`.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        auth_host: &ApiUrl,
        client_id: ClientId,
        client_secret: ClientSecret,
        scopes: Scopes,
    ) -> Self {
        Self {
            http,
            token_url: auth_host.join("oauth/token"),
            client_id,
            client_secret,
            scopes,
            token: Mutex::new(None),
        }
    }

    /// Returns the token endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Returns the `Authorization` header value, fetching a token if the
    /// cached one is missing or about to expire.
    ///
    /// Concurrent callers wait on the same fetch.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenRequestFailed`] if the token request fails.
    pub async fn authorization(&self) -> Result<String, AuthError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(format!("Bearer {}", token.value));
        }

        let token = self.request_token().await?;
        let header = format!("Bearer {}", token.value);
        *cached = Some(token);
        Ok(header)
    }

    /// Drops the cached token so the next request fetches a new one.
    pub async fn clear(&self) {
        self.token.lock().await.take();
    }

    async fn request_token(&self) -> Result<AccessToken, AuthError> {
        let mut form = vec![("grant_type", CLIENT_CREDENTIALS_GRANT_TYPE.to_string())];
        if !self.scopes.is_empty() {
            form.push(("scope", self.scopes.to_string()));
        }

        tracing::debug!(url = %self.token_url, "Requesting client credentials token");

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(self.client_id.as_ref(), Some(self.client_secret.as_ref()))
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::TokenRequestFailed {
                status: 0,
                message: format!("Network error: {e}"),
            })?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenRequestFailed {
                status,
                message: error_body,
            });
        }

        let token_response: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| AuthError::TokenRequestFailed {
                    status,
                    message: format!("Failed to parse token response: {e}"),
                })?;

        Ok(AccessToken {
            value: token_response.access_token,
            expires_at: token_response
                .expires_in
                .map(|seconds| Utc::now() + Duration::seconds(seconds)),
        })
    }
}

// Verify ClientCredentialsFlow is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientCredentialsFlow>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn flow(server: &MockServer, scopes: Scopes) -> ClientCredentialsFlow {
        ClientCredentialsFlow::new(
            reqwest::Client::new(),
            &ApiUrl::new(server.uri()).unwrap(),
            ClientId::new("my-client-id").unwrap(),
            ClientSecret::new("my-client-secret").unwrap(),
            scopes,
        )
    }

    #[test]
    fn test_token_freshness_respects_margin() {
        let now = Utc::now();
        let token = AccessToken {
            value: "t".to_string(),
            expires_at: Some(now + Duration::seconds(EXPIRY_MARGIN_SECONDS - 1)),
        };
        assert!(!token.is_fresh(now));

        let token = AccessToken {
            expires_at: Some(now + Duration::hours(1)),
            ..token
        };
        assert!(token.is_fresh(now));
    }

    #[test]
    fn test_token_without_expiry_is_always_fresh() {
        let token = AccessToken {
            value: "t".to_string(),
            expires_at: None,
        };
        assert!(token.is_fresh(Utc::now()));
    }

    #[tokio::test]
    async fn test_token_request_sends_basic_auth_grant_type_and_scopes() {
        let server = MockServer::start().await;

        // base64("my-client-id:my-client-secret")
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header(
                "authorization",
                "Basic bXktY2xpZW50LWlkOm15LWNsaWVudC1zZWNyZXQ=",
            ))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("scope=view_orders%3Amy-project"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "issued-token",
                "expires_in": 172_800,
                "scope": "view_orders:my-project",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let flow = flow(&server, Scopes::from(vec!["view_orders:my-project".to_string()]));

        // Second call is served from the cache
        assert_eq!(flow.authorization().await.unwrap(), "Bearer issued-token");
        assert_eq!(flow.authorization().await.unwrap(), "Bearer issued-token");
    }

    #[tokio::test]
    async fn test_clear_forces_new_token_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "issued-token",
                "expires_in": 172_800
            })))
            .expect(2)
            .mount(&server)
            .await;

        let flow = flow(&server, Scopes::new());
        flow.authorization().await.unwrap();
        flow.clear().await;
        flow.authorization().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_credentials_map_to_token_request_failed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "statusCode": 401,
                "message": "Please provide valid client credentials.",
                "error": "invalid_client"
            })))
            .mount(&server)
            .await;

        let result = flow(&server, Scopes::new()).authorization().await;

        match result {
            Err(AuthError::TokenRequestFailed { status, message }) => {
                assert_eq!(status, 401);
                assert!(message.contains("invalid_client"));
            }
            other => panic!("Expected TokenRequestFailed, got {other:?}"),
        }
    }
}
