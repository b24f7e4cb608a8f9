//! OAuth client-credentials authentication
//!
//! Marketo issues bearer tokens from its identity service; tokens last
//! about an hour. The token source keeps the current token in memory and
//! re-authenticates transparently when it is missing or close to expiry,
//! so every REST call sees a valid credential without the caller managing
//! token state.

use std::time::{Duration, Instant};

use reqwest::Client as HttpClient;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use marketo_api_contract::TokenResponse;

use crate::error::{MarketoError, MarketoResult};

/// Refresh this long before the vendor-reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

/// Fetches and caches bearer tokens for the Marketo identity service
#[derive(Debug)]
pub struct TokenSource {
    http_client: HttpClient,
    token_url: Url,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(
        http_client: HttpClient,
        base_url: &Url,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> MarketoResult<Self> {
        let token_url = base_url.join("identity/oauth/token")?;
        Ok(Self {
            http_client,
            token_url,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cached: Mutex::new(None),
        })
    }

    /// Return a bearer token, fetching a new one when the cached token is
    /// missing or within [`EXPIRY_MARGIN`] of expiry.
    pub async fn bearer_token(&self) -> MarketoResult<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        let response = self.fetch().await?;
        let access_token = response.access_token.clone();
        *cached = Some(CachedToken {
            access_token: response.access_token,
            expires_at: Instant::now() + Duration::from_secs(response.expires_in),
        });
        Ok(access_token)
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn fetch(&self) -> MarketoResult<TokenResponse> {
        debug!(url = %self.token_url, "requesting Marketo access token");

        let response = self
            .http_client
            .get(self.token_url.clone())
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(MarketoError::auth)?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketoError::Auth {
                detail: format!("token endpoint returned {status}"),
            });
        }

        response.json().await.map_err(MarketoError::auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_body(token: &str, expires_in: u64) -> serde_json::Value {
        serde_json::json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": expires_in,
            "scope": "owner@example.com"
        })
    }

    async fn token_source(server: &MockServer) -> TokenSource {
        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        TokenSource::new(HttpClient::new(), &base, "id", "secret").unwrap()
    }

    #[tokio::test]
    async fn fetches_token_with_client_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/identity/oauth/token"))
            .and(query_param("grant_type", "client_credentials"))
            .and(query_param("client_id", "id"))
            .and(query_param("client_secret", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 3599)))
            .expect(1)
            .mount(&server)
            .await;

        let source = token_source(&server).await;
        assert_eq!(source.bearer_token().await.unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn reuses_cached_token_until_invalidated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/identity/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 3599)))
            .expect(2)
            .mount(&server)
            .await;

        let source = token_source(&server).await;
        assert_eq!(source.bearer_token().await.unwrap(), "tok-1");
        assert_eq!(source.bearer_token().await.unwrap(), "tok-1");

        source.invalidate().await;
        assert_eq!(source.bearer_token().await.unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn refreshes_token_near_expiry() {
        let server = MockServer::start().await;
        // expires_in below the refresh margin forces a fetch on every call
        Mock::given(method("GET"))
            .and(path("/identity/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 30)))
            .expect(2)
            .mount(&server)
            .await;

        let source = token_source(&server).await;
        source.bearer_token().await.unwrap();
        source.bearer_token().await.unwrap();
    }

    #[tokio::test]
    async fn maps_rejection_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/identity/oauth/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let source = token_source(&server).await;
        let err = source.bearer_token().await.unwrap_err();
        assert!(matches!(err, MarketoError::Auth { .. }));
    }
}
