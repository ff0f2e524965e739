//! Error types shared by the token providers and the resource clients.
//!
//! The providers never hand out an empty or placeholder token: every failure
//! of `get_token` surfaces as one of the [`AuthError`] kinds below, and the
//! resource clients wrap that error unchanged in [`ClientError::Auth`].

use reqwest::StatusCode;
use thiserror::Error;

use crate::spotify::authorizer::FlowStep;

/// Failure of a token acquisition.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials are missing or invalid. Raised before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The token endpoint rejected the exchange or returned an unusable body.
    #[error("authentication failed{}: {message}", http_status(.status))]
    Authentication {
        status: Option<u16>,
        message: String,
    },

    /// A step of the scripted consent sequence could not complete.
    #[error("authorization flow failed at {step}: {reason}")]
    AuthorizationFlow { step: FlowStep, reason: String },

    /// Network, browser-launch or callback-server failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl AuthError {
    pub(crate) fn authentication<M: Into<String>>(status: Option<StatusCode>, message: M) -> Self {
        AuthError::Authentication {
            status: status.map(|s| s.as_u16()),
            message: message.into(),
        }
    }

    /// The failing step, for [`AuthError::AuthorizationFlow`] errors.
    pub fn step(&self) -> Option<FlowStep> {
        match self {
            AuthError::AuthorizationFlow { step, .. } => Some(*step),
            _ => None,
        }
    }
}

fn http_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Transport(TransportError::Http(err))
    }
}

/// Failures owned by the collaborators the providers talk through.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("browser session error: {0}")]
    Browser(String),

    #[error("callback server error: {0}")]
    Callback(String),
}

/// Failures reported by a [`crate::browser::Browser`].
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("no element matches {0}")]
    NoSuchElement(String),

    /// The element exists but the interaction was refused (not clickable,
    /// stale, hidden).
    #[error("cannot interact with {selector}: {message}")]
    Interaction { selector: String, message: String },

    #[error("browser session error: {0}")]
    Session(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Failure of a resource client call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
