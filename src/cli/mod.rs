//! # CLI Module
//!
//! Command implementations for the `sptfy` binary. Each command wires the
//! token providers into the resource client it needs, runs one operation and
//! prints the result as JSON on stdout. Status and errors go to stderr.
//!
//! ## Command Categories
//!
//! - [`token_app`], [`token_user`] - obtain and print a token
//! - [`search`] - catalog search
//! - [`browse`] - categories and new releases
//! - [`playlist`] - create, read and modify playlists
//! - [`resource`] - albums and artists by id
//!
//! ## Provider wiring
//!
//! One [`Providers`] value is built per process. The app and user providers
//! are shared through `Arc` by every client, so a token obtained for one
//! request is reused by the next as long as it is valid.

use std::{future::Future, sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::{
    browser::WebDriverLauncher,
    config, error,
    spotify::{
        auth::AppTokenProvider,
        authorizer::{ConsoleAuthorizer, InteractiveAuthorizer},
        pkce::PkceAuthorizer,
        user::UserTokenProvider,
    },
};

mod browse;
mod playlist;
mod resource;
mod search;
mod token;

pub use browse::{BrowseCommand, browse};
pub use playlist::{PlaylistCommand, playlist};
pub use resource::{ResourceCommand, resource};
pub use search::search;
pub use token::{token_app, token_user};

/// The process-wide token providers.
#[derive(Clone)]
pub struct Providers {
    pub app: Arc<AppTokenProvider>,
    pub user: Arc<UserTokenProvider>,
}

impl Providers {
    /// Builds both providers from the environment. `pkce` selects the
    /// authorization-code flow instead of the scripted console login.
    pub fn from_config(pkce: bool) -> Self {
        let authorizer: Arc<dyn InteractiveAuthorizer> = if pkce {
            Arc::new(PkceAuthorizer::from_config())
        } else {
            Arc::new(ConsoleAuthorizer::from_config(Arc::new(
                WebDriverLauncher::from_config(),
            )))
        };

        Self {
            app: Arc::new(AppTokenProvider::from_config()),
            user: Arc::new(
                UserTokenProvider::new(authorizer).with_assumed_ttl(config::user_token_ttl()),
            ),
        }
    }
}

/// Runs `fut` behind a spinner showing `message`.
pub(crate) async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let output = fut.await;
    pb.finish_and_clear();
    output
}

pub(crate) fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Cannot encode result. Err: {}", e),
    }
}
