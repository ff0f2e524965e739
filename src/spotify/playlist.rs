use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;

use crate::{
    config,
    error::ClientError,
    spotify::{auth::TokenSource, query_pairs, search::SearchClient, send_json},
    types::{
        AddTracksRequest, CreatePlaylistRequest, CreatePlaylistResponse, PlaylistOptions,
        RemoveTracksRequest, SnapshotResponse, TrackUri,
    },
    utils,
};

const DEFAULT_DESCRIPTION: &str = "A playlist";

/// Maximum number of items per add/remove request.
const MAX_TRACKS_PER_REQUEST: usize = 100;

/// Playlist reads (app token) and changes (user token).
///
/// Every call asks exactly one provider for a token: reads use the app
/// provider, anything that modifies the account uses the user provider.
#[derive(Clone)]
pub struct PlaylistClient {
    api_url: String,
    client: Client,
    app_tokens: Arc<dyn TokenSource>,
    user_tokens: Arc<dyn TokenSource>,
    user_id: Option<String>,
    search: SearchClient,
}

impl PlaylistClient {
    pub fn new(
        app_tokens: Arc<dyn TokenSource>,
        user_tokens: Arc<dyn TokenSource>,
        user_id: Option<String>,
    ) -> Self {
        let client = Client::new();
        Self {
            api_url: config::DEFAULT_API_URL.to_string(),
            search: SearchClient::new(Arc::clone(&app_tokens)).with_client(client.clone()),
            client,
            app_tokens,
            user_tokens,
            user_id,
        }
    }

    pub fn from_config(app_tokens: Arc<dyn TokenSource>, user_tokens: Arc<dyn TokenSource>) -> Self {
        Self::new(app_tokens, user_tokens, config::spotify_user())
            .with_api_url(config::spotify_apiurl())
    }

    pub fn with_api_url<S: Into<String>>(mut self, url: S) -> Self {
        let url = url.into().trim_end_matches('/').to_string();
        self.search = self.search.with_api_url(url.clone());
        self.api_url = url;
        self
    }

    pub async fn create(
        &self,
        name: &str,
        options: &PlaylistOptions,
    ) -> Result<CreatePlaylistResponse, ClientError> {
        let user_id = self
            .user_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ClientError::InvalidArgument("user id is required to create a playlist".to_string())
            })?;

        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: options
                .description
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            public: options.public,
            collaborative: options.collaborative,
        };

        let token = self.user_tokens.bearer_token().await?;
        let request = self
            .client
            .post(format!("{}/users/{}/playlists", self.api_url, user_id))
            .bearer_auth(token)
            .json(&body);

        send_json(request).await
    }

    pub async fn get(&self, playlist_id: &str, market: Option<&str>) -> Result<Value, ClientError> {
        let params = query_pairs(&[("market", market.map(str::to_string))]);

        let token = self.app_tokens.bearer_token().await?;
        let request = self
            .client
            .get(format!("{}/playlists/{}", self.api_url, playlist_id))
            .bearer_auth(token)
            .query(&params);

        send_json(request).await
    }

    pub async fn tracks(
        &self,
        playlist_id: &str,
        market: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Value, ClientError> {
        let params = query_pairs(&[
            ("market", market.map(str::to_string)),
            ("limit", Some(utils::checked_limit(limit).to_string())),
        ]);

        let token = self.app_tokens.bearer_token().await?;
        let request = self
            .client
            .get(format!("{}/playlists/{}/tracks", self.api_url, playlist_id))
            .bearer_auth(token)
            .query(&params);

        send_json(request).await
    }

    /// Adds tracks by URI, in batches of 100. Returns the last snapshot.
    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<SnapshotResponse, ClientError> {
        self.modify_tracks(playlist_id, uris, |chunk| {
            let body = AddTracksRequest {
                uris: chunk.to_vec(),
            };
            (reqwest::Method::POST, serde_json::to_value(body))
        })
        .await
    }

    pub async fn remove_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<SnapshotResponse, ClientError> {
        self.modify_tracks(playlist_id, uris, |chunk| {
            let body = RemoveTracksRequest {
                tracks: chunk.iter().map(|uri| TrackUri { uri: uri.clone() }).collect(),
            };
            (reqwest::Method::DELETE, serde_json::to_value(body))
        })
        .await
    }

    /// Resolves `tracks` to URIs. Values that already are Spotify URIs are
    /// kept, anything else is looked up by name.
    pub async fn resolve_tracks(&self, tracks: &[String]) -> Result<Vec<String>, ClientError> {
        let mut uris = Vec::with_capacity(tracks.len());
        for track in tracks {
            if track.starts_with("spotify:track:") {
                uris.push(track.clone());
            } else {
                uris.push(self.search.track_uri(track).await?);
            }
        }
        Ok(uris)
    }

    pub async fn find_id(&self, name: &str) -> Result<String, ClientError> {
        self.search.playlist_id(name).await
    }

    async fn modify_tracks<F>(
        &self,
        playlist_id: &str,
        uris: &[String],
        body_for: F,
    ) -> Result<SnapshotResponse, ClientError>
    where
        F: Fn(&[String]) -> (reqwest::Method, serde_json::Result<Value>),
    {
        if uris.is_empty() {
            return Err(ClientError::InvalidArgument(
                "at least one track is required".to_string(),
            ));
        }

        let url = format!("{}/playlists/{}/tracks", self.api_url, playlist_id);
        let mut snapshot = None;
        for chunk in uris.chunks(MAX_TRACKS_PER_REQUEST) {
            let (method, body) = body_for(chunk);
            let body = body.map_err(|e| ClientError::InvalidArgument(e.to_string()))?;

            let token = self.user_tokens.bearer_token().await?;
            let request = self
                .client
                .request(method, &url)
                .bearer_auth(token)
                .json(&body);
            snapshot = Some(send_json::<SnapshotResponse>(request).await?);
        }

        snapshot.ok_or_else(|| ClientError::InvalidArgument("no tracks sent".to_string()))
    }
}
