use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;

use crate::{
    config,
    error::ClientError,
    spotify::{auth::TokenSource, query_pairs, send_json},
    types::{SearchQuery, SearchType},
    utils,
};

/// Catalog search with an app-scoped token.
#[derive(Clone)]
pub struct SearchClient {
    api_url: String,
    client: Client,
    tokens: Arc<dyn TokenSource>,
}

impl SearchClient {
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

    /// Searches the catalog. An empty `kinds` searches tracks.
    pub async fn search(
        &self,
        query: &SearchQuery,
        kinds: &[SearchType],
        limit: Option<u32>,
    ) -> Result<Value, ClientError> {
        if query.is_empty() {
            return Err(ClientError::InvalidArgument(
                "search query is empty".to_string(),
            ));
        }

        let kinds = if kinds.is_empty() {
            SearchType::Track.as_str().to_string()
        } else {
            kinds
                .iter()
                .map(SearchType::as_str)
                .collect::<Vec<_>>()
                .join(",")
        };
        let params = query_pairs(&[
            ("q", Some(query.to_query_string())),
            ("type", Some(kinds)),
            ("limit", Some(utils::checked_limit(limit).to_string())),
        ]);

        let token = self.tokens.bearer_token().await?;
        let request = self
            .client
            .get(format!("{}/search", self.api_url))
            .bearer_auth(token)
            .query(&params);

        send_json(request).await
    }

    /// URI of the first track whose name matches `name`.
    pub async fn track_uri(&self, name: &str) -> Result<String, ClientError> {
        let result = self
            .search(&SearchQuery::track(name), &[SearchType::Track], Some(1))
            .await?;

        result["tracks"]["items"][0]["uri"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClientError::NotFound(format!("track '{}'", name)))
    }

    /// Id of the first playlist whose name is exactly `name`.
    pub async fn playlist_id(&self, name: &str) -> Result<String, ClientError> {
        let result = self
            .search(&SearchQuery::playlist(name), &[SearchType::Playlist], Some(50))
            .await?;

        result["playlists"]["items"]
            .as_array()
            .into_iter()
            .flatten()
            .find(|p| p["name"].as_str() == Some(name))
            .and_then(|p| p["id"].as_str())
            .map(str::to_string)
            .ok_or_else(|| ClientError::NotFound(format!("playlist '{}'", name)))
    }
}
