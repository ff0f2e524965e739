//! Interactive authorization for user-scoped tokens.
//!
//! [`InteractiveAuthorizer`] is the seam between the user token provider and
//! whatever obtains consent from the account owner. Two implementations
//! exist:
//!
//! - [`ConsoleAuthorizer`] remote-controls a browser through the developer
//!   console's "get token" page and scrapes the token it displays.
//! - [`crate::spotify::pkce::PkceAuthorizer`] runs a regular
//!   authorization-code flow with PKCE.
//!
//! The console flow is a fixed sequence of steps. Each step either completes
//! and advances, or aborts the whole flow with
//! [`AuthError::AuthorizationFlow`] naming the step. There is no resume; the
//! caller starts over from [`FlowStep::NavigateToAuthPage`].

use std::{fmt, sync::Arc};

use async_trait::async_trait;

use crate::{
    browser::{Browser, BrowserLauncher, Element, Selector},
    config,
    error::{AuthError, BrowserError, TransportError},
    info,
    types::{Account, AuthorizedToken},
    warning,
};

const ACCOUNT_ID_FIELD: &str = "path-param-user_id";
const TOKEN_FORM_BUTTON: &str = ".btn-green";
const REQUIRED_SCOPES: [&str; 2] = ["playlist-modify-public", "playlist-modify-private"];
const REQUEST_TOKEN_BUTTON: &str = "#oauthRequestToken";
const LOGIN_USERNAME: &str = "login-username";
const LOGIN_PASSWORD: &str = "login-password";
const LOGIN_REMEMBER: &str = "login-remember";
const LOGIN_REMEMBER_TOGGLE: &str = ".control-indicator";
const LOGIN_BUTTON: &str = "login-button";
const TOKEN_FIELD: &str = "oauth-input";

/// Scroll offset that brings the console form into view.
const FORM_SCROLL_Y: u32 = 450;

/// Steps of the nested login sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginStep {
    EnterUsername,
    EnterPassword,
    ClearRememberMeSelection,
    ClickLoginButton,
}

/// Steps of the console consent flow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowStep {
    NavigateToAuthPage,
    FillAccountIdentifier,
    SubmitTokenRequestForm,
    EnsureRequiredScopesSelected,
    ClickRequestToken,
    PerformLogin(LoginStep),
    ExtractTokenFromPage,
}

impl fmt::Display for LoginStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStep::PerformLogin(step) => write!(f, "PerformLogin/{}", step),
            other => fmt::Debug::fmt(other, f),
        }
    }
}

/// Obtains a user-scoped token with the account owner's consent.
#[async_trait]
pub trait InteractiveAuthorizer: Send + Sync {
    async fn authorize(&self) -> Result<AuthorizedToken, AuthError>;
}

/// Scripts the developer console's token page in a remote-controlled browser.
///
/// The page does not report the token's lifetime, so the returned
/// [`AuthorizedToken`] carries no `expires_in`.
pub struct ConsoleAuthorizer {
    launcher: Arc<dyn BrowserLauncher>,
    account: Account,
    console_url: String,
}

impl ConsoleAuthorizer {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, account: Account) -> Self {
        Self {
            launcher,
            account,
            console_url: config::DEFAULT_CONSOLE_URL.to_string(),
        }
    }

    pub fn from_config(launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self::new(launcher, config::account()).with_console_url(config::spotify_console_url())
    }

    pub fn with_console_url<S: Into<String>>(mut self, url: S) -> Self {
        self.console_url = url.into();
        self
    }

    fn identity(&self) -> Result<(&str, &str), AuthError> {
        let user_id = self.account.user_id.as_deref().filter(|s| !s.is_empty());
        let password = self.account.password.as_deref().filter(|s| !s.is_empty());
        match (user_id, password) {
            (Some(u), Some(p)) => Ok((u, p)),
            (None, _) => Err(AuthError::Configuration(
                "user id is required for the console login".to_string(),
            )),
            (_, None) => Err(AuthError::Configuration(
                "password is required for the console login".to_string(),
            )),
        }
    }

    async fn run(
        &self,
        browser: &dyn Browser,
        user_id: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let mut flow = Flow {
            browser,
            step: FlowStep::NavigateToAuthPage,
        };

        flow.enter(FlowStep::NavigateToAuthPage);
        flow.check(browser.open(&self.console_url).await)?;
        flow.check(browser.scroll_to(FORM_SCROLL_Y).await)?;

        flow.enter(FlowStep::FillAccountIdentifier);
        let field = flow.find(&Selector::id(ACCOUNT_ID_FIELD)).await?;
        flow.check(browser.type_text(&field, user_id).await)?;

        flow.enter(FlowStep::SubmitTokenRequestForm);
        flow.click(&Selector::css(TOKEN_FORM_BUTTON)).await?;

        flow.enter(FlowStep::EnsureRequiredScopesSelected);
        for scope in REQUIRED_SCOPES {
            let id = format!("scope-{}", scope);
            let checkbox = flow.find(&Selector::id(id.as_str())).await?;
            if !flow.is_selected(&checkbox).await? {
                flow.click(&Selector::css(format!("#{}+ .control-indicator", id)))
                    .await?;
            }
        }

        flow.enter(FlowStep::ClickRequestToken);
        flow.click(&Selector::css(REQUEST_TOKEN_BUTTON)).await?;

        // An existing session skips straight back to the console.
        match browser.find(&Selector::id(LOGIN_USERNAME)).await {
            Ok(username) => self.login(&mut flow, username, user_id, password).await?,
            Err(BrowserError::NoSuchElement(_)) => {
                info!("Browser session already authenticated, skipping login");
            }
            Err(e) => return Err(flow.fail(e)),
        }

        flow.enter(FlowStep::ExtractTokenFromPage);
        flow.check(browser.scroll_to(FORM_SCROLL_Y).await)?;
        let token_field = flow.find(&Selector::id(TOKEN_FIELD)).await?;
        let token = flow
            .check(browser.attribute(&token_field, "value").await)?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        token.ok_or_else(|| AuthError::AuthorizationFlow {
            step: FlowStep::ExtractTokenFromPage,
            reason: "token field is empty".to_string(),
        })
    }

    async fn login(
        &self,
        flow: &mut Flow<'_>,
        username: Element,
        user_id: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let browser = flow.browser;

        flow.enter(FlowStep::PerformLogin(LoginStep::EnterUsername));
        flow.check(browser.type_text(&username, user_id).await)?;

        flow.enter(FlowStep::PerformLogin(LoginStep::EnterPassword));
        let password_field = flow.find(&Selector::id(LOGIN_PASSWORD)).await?;
        flow.check(browser.type_text(&password_field, password).await)?;

        flow.enter(FlowStep::PerformLogin(LoginStep::ClearRememberMeSelection));
        match browser.find(&Selector::id(LOGIN_REMEMBER)).await {
            Ok(remember) => {
                if flow.is_selected(&remember).await? {
                    flow.click(&Selector::css(LOGIN_REMEMBER_TOGGLE)).await?;
                }
            }
            // optional
            Err(BrowserError::NoSuchElement(_)) => {}
            Err(e) => return Err(flow.fail(e)),
        }

        flow.enter(FlowStep::PerformLogin(LoginStep::ClickLoginButton));
        flow.click(&Selector::id(LOGIN_BUTTON)).await
    }
}

#[async_trait]
impl InteractiveAuthorizer for ConsoleAuthorizer {
    async fn authorize(&self) -> Result<AuthorizedToken, AuthError> {
        let (user_id, password) = self.identity()?;

        info!("Opening browser to authorize {}", user_id);
        let browser = self
            .launcher
            .launch()
            .await
            .map_err(|e| AuthError::Transport(TransportError::Browser(e.to_string())))?;

        let result = self.run(browser.as_ref(), user_id, password).await;

        if let Err(e) = browser.close().await {
            warning!("Failed to close browser session: {}", e);
        }

        result.map(|access_token| AuthorizedToken {
            access_token,
            expires_in: None,
        })
    }
}

/// Tracks the current step so browser failures can be attributed to it.
struct Flow<'a> {
    browser: &'a dyn Browser,
    step: FlowStep,
}

impl<'a> Flow<'a> {
    fn enter(&mut self, step: FlowStep) {
        self.step = step;
    }

    fn fail(&self, err: BrowserError) -> AuthError {
        match err {
            BrowserError::NoSuchElement(selector) => AuthError::AuthorizationFlow {
                step: self.step,
                reason: format!("page element {} is missing", selector),
            },
            BrowserError::Interaction { selector, message } => AuthError::AuthorizationFlow {
                step: self.step,
                reason: format!("cannot interact with {}: {}", selector, message),
            },
            BrowserError::Session(message) => {
                AuthError::Transport(TransportError::Browser(message))
            }
            BrowserError::Http(e) => AuthError::Transport(TransportError::Http(e)),
        }
    }

    fn check<T>(&self, result: Result<T, BrowserError>) -> Result<T, AuthError> {
        result.map_err(|e| self.fail(e))
    }

    async fn find(&self, selector: &Selector) -> Result<Element, AuthError> {
        self.check(self.browser.find(selector).await)
    }

    async fn click(&self, selector: &Selector) -> Result<(), AuthError> {
        let element = self.find(selector).await?;
        self.check(self.browser.click(&element).await)
    }

    async fn is_selected(&self, element: &Element) -> Result<bool, AuthError> {
        let checked = self.check(self.browser.attribute(element, "checked").await)?;
        Ok(matches!(checked.as_deref(), Some("true") | Some("checked")))
    }
}
