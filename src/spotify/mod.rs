//! # Spotify Integration Module
//!
//! Token acquisition and the resource clients built on top of it.
//!
//! ## Architecture
//!
//! ```text
//! Resource clients (search, browse, playlist, resource)
//!          ↓  one bearer token per request
//! Token providers (app / user), each owning a CredentialStore
//!          ↓  only when the cached token is missing or expired
//! Token endpoint (client credentials)  |  Interactive authorizer
//!                                      |   ├── console (scripted browser)
//!                                      |   └── PKCE (callback server)
//! ```
//!
//! ## Token providers
//!
//! - [`auth::AppTokenProvider`] - client-credentials grant for app-level
//!   access (search, browse, reading playlists).
//! - [`user::UserTokenProvider`] - user-level access for playlist changes,
//!   obtained through an [`authorizer::InteractiveAuthorizer`].
//!
//! Refresh is lazy: a provider only contacts the token endpoint (or starts
//! the authorizer) when a caller asks for a token and the stored one is
//! missing or expired. Nothing polls.
//!
//! ## Resource clients
//!
//! - [`search::SearchClient`] - `GET /search`
//! - [`browse::BrowseClient`] - `GET /browse/...`
//! - [`playlist::PlaylistClient`] - `/users/{user_id}/playlists`, `/playlists/{id}`
//! - [`resource::ResourceClient`] - `/albums/{id}`, `/artists/{id}` and their
//!   tracks, albums, top tracks and related artists
//!
//! Clients receive their providers as [`auth::TokenSource`] trait objects and
//! ask for a token right before each request. They never cache tokens
//! themselves, and provider errors reach the caller unchanged inside
//! [`crate::error::ClientError::Auth`].

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::ClientError;

pub mod auth;
pub mod authorizer;
pub mod browse;
pub mod pkce;
pub mod playlist;
pub mod resource;
pub mod search;
pub mod user;

/// Sends `request` and decodes a successful JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<T>().await?)
}

/// Query pairs with unset values dropped.
pub(crate) fn query_pairs(pairs: &[(&'static str, Option<String>)]) -> Vec<(&'static str, String)> {
    pairs
        .iter()
        .filter_map(|(k, v)| v.clone().map(|v| (*k, v)))
        .collect()
}
