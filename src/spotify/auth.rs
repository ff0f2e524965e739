use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, header::AUTHORIZATION};
use tokio::sync::Mutex;

use crate::{
    config,
    error::AuthError,
    info,
    management::{Credential, CredentialStore},
    types::{AppCredentials, TokenResponse},
    utils,
};

/// Anything that can hand out a bearer token for a single request.
///
/// Resource clients call this immediately before building a request and do
/// not keep the returned token beyond it.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer_token(&self) -> Result<String, AuthError>;
}

/// Obtains app-scoped tokens through the client-credentials grant.
///
/// The provider is the only writer of its [`CredentialStore`]. The store sits
/// behind a mutex that is held for the whole check-then-refresh sequence, so
/// concurrent callers that all observe an expired token trigger a single
/// exchange: the first one refreshes, the others wait and then find the fresh
/// token in the store.
///
/// # Example
///
/// ```rust,ignore
/// let provider = AppTokenProvider::new(AppCredentials::from_pair("id", "secret"));
/// let token = provider.get_token().await?;
/// ```
#[derive(Debug)]
pub struct AppTokenProvider {
    credentials: AppCredentials,
    token_url: String,
    client: Client,
    store: Mutex<CredentialStore>,
}

impl AppTokenProvider {
    /// Creates a provider for the given application credentials.
    ///
    /// Nothing is validated here. Missing credentials are reported by the
    /// first [`get_token`](Self::get_token) call, before any request is sent.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Client id and secret issued for the application
    pub fn new(credentials: AppCredentials) -> Self {
        Self {
            credentials,
            token_url: config::DEFAULT_TOKEN_URL.to_string(),
            client: Client::new(),
            store: Mutex::new(CredentialStore::new()),
        }
    }

    /// Creates a provider from `SPOTIFY_API_AUTH_CLIENT_ID`,
    /// `SPOTIFY_API_AUTH_CLIENT_SECRET` and `SPOTIFY_API_TOKEN_URL`.
    pub fn from_config() -> Self {
        Self::new(config::app_credentials()).with_token_url(config::spotify_apitoken_url())
    }

    /// Overrides the token endpoint.
    pub fn with_token_url<S: Into<String>>(mut self, url: S) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Returns a valid app token, exchanging credentials only when needed.
    ///
    /// The current time is read after the store lock is acquired, so a caller
    /// that waited behind another caller's exchange judges validity at the
    /// moment it actually looks at the store.
    ///
    /// # Returns
    ///
    /// The bearer token, or the [`AuthError`] that prevented obtaining one.
    /// No token is cached on failure.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Configuration`] when the client id or secret is missing
    /// - [`AuthError::Authentication`] when the endpoint rejects the exchange
    ///   or answers with an unusable body
    /// - [`AuthError::Transport`] when the endpoint cannot be reached
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let provider = AppTokenProvider::from_config();
    /// let token = provider.get_token().await?;
    /// ```
    pub async fn get_token(&self) -> Result<String, AuthError> {
        let mut store = self.store.lock().await;
        self.token_locked(&mut store, Utc::now()).await
    }

    /// Same as [`get_token`](Self::get_token) with an explicit current time.
    ///
    /// # Arguments
    ///
    /// * `now` - Instant against which the cached token's expiry is checked
    ///   and from which a new token's expiry is computed
    pub async fn get_token_at(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let mut store = self.store.lock().await;
        self.token_locked(&mut store, now).await
    }

    /// Snapshot of the stored credential.
    pub async fn credential(&self) -> Credential {
        self.store.lock().await.get()
    }

    pub async fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.store.lock().await.is_valid(now)
    }

    async fn token_locked(
        &self,
        store: &mut CredentialStore,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        if let Some(token) = store.valid_token(now) {
            return Ok(token);
        }

        let (access_token, expires_in) = self.exchange().await?;
        store.set(access_token.clone(), expires_in, now);

        Ok(access_token)
    }

    fn client_credentials(&self) -> Result<(&str, &str), AuthError> {
        let client_id = self
            .credentials
            .client_id
            .as_deref()
            .filter(|s| !s.is_empty());
        let client_secret = self
            .credentials
            .client_secret
            .as_deref()
            .filter(|s| !s.is_empty());

        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            (None, _) => Err(AuthError::Configuration(
                "client id is required to request a token".to_string(),
            )),
            (_, None) => Err(AuthError::Configuration(
                "client secret is required to request a token".to_string(),
            )),
        }
    }

    async fn exchange(&self) -> Result<(String, u64), AuthError> {
        let (client_id, client_secret) = self.client_credentials()?;

        info!("Requesting app token");
        let response = self
            .client
            .post(&self.token_url)
            .header(
                AUTHORIZATION,
                format!("Basic {}", utils::basic_credentials(client_id, client_secret)),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::authentication(
                Some(status),
                format!("client could not be authenticated: {}", body.trim()),
            ));
        }

        let body = response.text().await?;
        parse_token_response(&body)
    }
}

/// Extracts `access_token` and a positive `expires_in` from a token endpoint
/// body.
pub(crate) fn parse_token_response(body: &str) -> Result<(String, u64), AuthError> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| AuthError::authentication(None, format!("unparsable token response: {}", e)))?;

    let access_token = parsed
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::authentication(None, "token response has no access_token"))?;

    let expires_in = match parsed.expires_in {
        Some(secs) if secs > 0 => secs as u64,
        Some(secs) => {
            return Err(AuthError::authentication(
                None,
                format!("token response has non-positive expires_in {}", secs),
            ));
        }
        None => {
            return Err(AuthError::authentication(
                None,
                "token response has no expires_in",
            ));
        }
    };

    Ok((access_token, expires_in))
}

#[async_trait]
impl TokenSource for AppTokenProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        self.get_token().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_complete_response() {
        let (token, ttl) =
            parse_token_response(r#"{"access_token":"abc123","token_type":"Bearer","expires_in":3600}"#)
                .unwrap();
        assert_eq!(token, "abc123");
        assert_eq!(ttl, 3600);
    }

    #[test]
    fn parse_rejects_missing_fields() {
        for body in [
            r#"{"expires_in":3600}"#,
            r#"{"access_token":"abc123"}"#,
            r#"{"access_token":"","expires_in":3600}"#,
            r#"{"access_token":"abc123","expires_in":0}"#,
            r#"not json"#,
        ] {
            let err = parse_token_response(body).expect_err(body);
            assert!(matches!(err, AuthError::Authentication { status: None, .. }), "{body}: {err:?}");
        }
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_request() {
        // Unroutable URL: a request would surface as a transport error.
        let cases = [
            AppCredentials::new(None, Some("y".to_string())),
            AppCredentials::new(Some("x".to_string()), None),
            AppCredentials::from_pair("", "y"),
            AppCredentials::from_pair("x", ""),
        ];
        for credentials in cases {
            let provider = AppTokenProvider::new(credentials).with_token_url("http://127.0.0.1:0/api/token");
            let err = provider.get_token().await.expect_err("should fail");
            assert!(matches!(err, AuthError::Configuration(_)), "{err:?}");
            assert!(!provider.is_valid(Utc::now()).await);
        }
    }
}
