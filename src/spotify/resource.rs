use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;

use crate::{
    config,
    error::ClientError,
    spotify::{auth::TokenSource, query_pairs, send_json},
    warning,
};

/// Market used for top tracks when none is given.
pub const DEFAULT_TOP_TRACKS_COUNTRY: &str = "US";

/// Album and artist lookups by id with an app-scoped token.
#[derive(Clone)]
pub struct ResourceClient {
    api_url: String,
    client: Client,
    tokens: Arc<dyn TokenSource>,
}

impl ResourceClient {
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            api_url: config::DEFAULT_API_URL.to_string(),
            client: Client::new(),
            tokens,
        }
    }

    pub fn from_config(tokens: Arc<dyn TokenSource>) -> Self {
        Self::new(tokens).with_api_url(config::spotify_apiurl())
    }

    pub fn with_api_url<S: Into<String>>(mut self, url: S) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub async fn album(&self, album_id: &str) -> Result<Value, ClientError> {
        self.get(&format!("/albums/{}", album_id), &[]).await
    }

    pub async fn album_tracks(&self, album_id: &str) -> Result<Value, ClientError> {
        self.get(&format!("/albums/{}/tracks", album_id), &[]).await
    }

    pub async fn artist(&self, artist_id: &str) -> Result<Value, ClientError> {
        self.get(&format!("/artists/{}", artist_id), &[]).await
    }

    pub async fn artist_albums(&self, artist_id: &str) -> Result<Value, ClientError> {
        self.get(&format!("/artists/{}/albums", artist_id), &[]).await
    }

    /// Top tracks of an artist in `country` (uppercased). Without a country
    /// the lookup warns and uses [`DEFAULT_TOP_TRACKS_COUNTRY`].
    pub async fn artist_top_tracks(
        &self,
        artist_id: &str,
        country: Option<&str>,
    ) -> Result<Value, ClientError> {
        let country = match country.map(str::trim).filter(|c| !c.is_empty()) {
            Some(country) => country.to_ascii_uppercase(),
            None => {
                warning!(
                    "No country given for top tracks. Using {} as default",
                    DEFAULT_TOP_TRACKS_COUNTRY
                );
                DEFAULT_TOP_TRACKS_COUNTRY.to_string()
            }
        };
        let params = query_pairs(&[("country", Some(country))]);
        self.get(&format!("/artists/{}/top-tracks", artist_id), &params)
            .await
    }

    pub async fn related_artists(&self, artist_id: &str) -> Result<Value, ClientError> {
        self.get(&format!("/artists/{}/related-artists", artist_id), &[])
            .await
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, ClientError> {
        let token = self.tokens.bearer_token().await?;
        let request = self
            .client
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(token)
            .query(params);

        send_json(request).await
    }
}
