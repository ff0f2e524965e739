use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};
use tokio::{sync::Mutex, time::Instant};

use crate::{
    api::SharedSession,
    config,
    error::{AuthError, TransportError},
    info,
    server::start_api_server,
    spotify::{auth::parse_token_response, authorizer::InteractiveAuthorizer},
    types::{AuthorizedToken, CallbackOutcome, PkceSession},
    utils, warning,
};

const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Authorization-code flow with PKCE.
///
/// Opens the authorization page in the user's default browser and waits for
/// the redirect on a local callback server. Unlike the console flow, the token
/// endpoint reports the token lifetime, which is passed on to the provider.
///
/// # Authentication Flow
///
/// 1. Generate a code verifier and its S256 challenge
/// 2. Start the local callback server
/// 3. Open the authorization URL in the browser
/// 4. Wait for the callback carrying the authorization code
/// 5. Exchange code and verifier for an access token
#[derive(Debug, Clone)]
pub struct PkceAuthorizer {
    client_id: Option<String>,
    auth_url: String,
    token_url: String,
    redirect_uri: String,
    scope: String,
    server_addr: String,
    callback_timeout: Duration,
    open_browser: bool,
    client: Client,
}

impl PkceAuthorizer {
    pub fn new(client_id: Option<String>) -> Self {
        Self {
            client_id,
            auth_url: config::DEFAULT_AUTH_URL.to_string(),
            token_url: config::DEFAULT_TOKEN_URL.to_string(),
            redirect_uri: config::DEFAULT_REDIRECT_URI.to_string(),
            scope: config::DEFAULT_SCOPE.to_string(),
            server_addr: config::DEFAULT_SERVER_ADDRESS.to_string(),
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
            open_browser: true,
            client: Client::new(),
        }
    }

    pub fn from_config() -> Self {
        Self {
            auth_url: config::spotify_apiauth_url(),
            token_url: config::spotify_apitoken_url(),
            redirect_uri: config::spotify_redirect_uri(),
            scope: config::spotify_scope(),
            server_addr: config::server_addr(),
            ..Self::new(config::spotify_client_id())
        }
    }

    pub fn with_token_url<S: Into<String>>(mut self, url: S) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_redirect_uri<S: Into<String>>(mut self, uri: S) -> Self {
        self.redirect_uri = uri.into();
        self
    }

    pub fn with_server_addr<S: Into<String>>(mut self, addr: S) -> Self {
        self.server_addr = addr.into();
        self
    }

    pub fn with_callback_timeout(mut self, timeout: Duration) -> Self {
        self.callback_timeout = timeout;
        self
    }

    /// Disables launching the system browser; the URL is only printed.
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    fn client_id(&self) -> Result<&str, AuthError> {
        self.client_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AuthError::Configuration("client id is required for the PKCE flow".to_string())
            })
    }

    pub fn authorize_url(&self, code_challenge: &str, state: &str) -> Result<String, AuthError> {
        let client_id = self.client_id()?;
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", client_id),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code_challenge_method", "S256"),
                ("code_challenge", code_challenge),
                ("state", state),
                ("scope", self.scope.as_str()),
            ],
        )
        .map_err(|e| AuthError::Configuration(format!("invalid authorization url: {}", e)))?;

        Ok(url.to_string())
    }

    /// Exchanges an authorization code for a token.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthorizedToken, AuthError> {
        let client_id = self.client_id()?;
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", client_id),
                ("code", code),
                ("code_verifier", code_verifier),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::authentication(
                Some(status),
                format!("code exchange rejected: {}", body.trim()),
            ));
        }

        let (access_token, expires_in) = parse_token_response(&response.text().await?)?;
        Ok(AuthorizedToken {
            access_token,
            expires_in: Some(expires_in),
        })
    }

    async fn wait_for_code(&self, shared_state: &SharedSession) -> Result<String, AuthError> {
        let deadline = Instant::now() + self.callback_timeout;

        while Instant::now() < deadline {
            let outcome = shared_state
                .lock()
                .await
                .as_ref()
                .and_then(|s| s.outcome.clone());

            match outcome {
                Some(CallbackOutcome::Code(code)) => return Ok(code),
                Some(CallbackOutcome::Denied(reason)) => {
                    return Err(AuthError::authentication(
                        None,
                        format!("authorization denied: {}", reason),
                    ));
                }
                None => tokio::time::sleep(Duration::from_millis(250)).await,
            }
        }

        Err(AuthError::Transport(TransportError::Callback(format!(
            "no authorization callback within {}s",
            self.callback_timeout.as_secs()
        ))))
    }
}

#[async_trait]
impl InteractiveAuthorizer for PkceAuthorizer {
    async fn authorize(&self) -> Result<AuthorizedToken, AuthError> {
        let code_verifier = utils::generate_code_verifier();
        self.run(&code_verifier, utils::generate_state()).await
    }
}

impl PkceAuthorizer {
    async fn run(&self, code_verifier: &str, state: String) -> Result<AuthorizedToken, AuthError> {
        let code_challenge = utils::generate_code_challenge(code_verifier);
        let auth_url = self.authorize_url(&code_challenge, &state)?;

        let shared_state: SharedSession = Arc::new(Mutex::new(Some(PkceSession {
            state,
            outcome: None,
        })));
        let server = start_api_server(Arc::clone(&shared_state), &self.server_addr).await?;

        if !self.open_browser || webbrowser::open(&auth_url).is_err() {
            warning!(
                "Please navigate to the following URL to authorize:\n{}",
                auth_url
            );
        } else {
            info!("Waiting for authorization in the browser");
        }

        let code = self.wait_for_code(&shared_state).await;
        server.shutdown().await;

        self.exchange_code(&code?, code_verifier).await
    }
}
