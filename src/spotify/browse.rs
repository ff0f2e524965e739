use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;

use crate::{
    config,
    error::ClientError,
    spotify::{auth::TokenSource, query_pairs, send_json},
    utils,
};

/// Browse categories and new releases with an app-scoped token.
#[derive(Clone)]
pub struct BrowseClient {
    api_url: String,
    client: Client,
    tokens: Arc<dyn TokenSource>,
}

impl BrowseClient {
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

    pub async fn categories(
        &self,
        country: Option<&str>,
        locale: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Value, ClientError> {
        let params = query_pairs(&[
            ("country", country.map(str::to_string)),
            ("locale", locale.map(str::to_string)),
            ("limit", Some(utils::checked_limit(limit).to_string())),
        ]);
        self.get("/browse/categories", &params).await
    }

    /// A single category. Takes no limit.
    pub async fn category(
        &self,
        category_id: &str,
        country: Option<&str>,
        locale: Option<&str>,
    ) -> Result<Value, ClientError> {
        let params = query_pairs(&[
            ("country", country.map(str::to_string)),
            ("locale", locale.map(str::to_string)),
        ]);
        self.get(&format!("/browse/categories/{}", category_id), &params)
            .await
    }

    /// Playlists of a category. The endpoint takes no locale.
    pub async fn category_playlists(
        &self,
        category_id: &str,
        country: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Value, ClientError> {
        let params = query_pairs(&[
            ("country", country.map(str::to_string)),
            ("limit", Some(utils::checked_limit(limit).to_string())),
        ]);
        self.get(
            &format!("/browse/categories/{}/playlists", category_id),
            &params,
        )
        .await
    }

    /// The playlist named exactly `name` among a category's playlists.
    pub async fn category_playlist(
        &self,
        name: &str,
        category_id: &str,
        country: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Value, ClientError> {
        let playlists = self.category_playlists(category_id, country, limit).await?;

        playlists["playlists"]["items"]
            .as_array()
            .into_iter()
            .flatten()
            .find(|p| p["name"].as_str() == Some(name))
            .cloned()
            .ok_or_else(|| {
                ClientError::NotFound(format!(
                    "playlist '{}' in category '{}'",
                    name, category_id
                ))
            })
    }

    pub async fn new_releases(
        &self,
        country: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Value, ClientError> {
        let params = query_pairs(&[
            ("country", country.map(str::to_string)),
            ("limit", Some(utils::checked_limit(limit).to_string())),
        ]);
        self.get("/browse/new-releases", &params).await
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
