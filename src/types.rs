use std::fmt;

use serde::{Deserialize, Serialize};

/// Application identity for the client-credentials exchange.
#[derive(Clone, Default)]
pub struct AppCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl AppCredentials {
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id,
            client_secret,
        }
    }

    pub fn from_pair<I: Into<String>, S: Into<String>>(client_id: I, client_secret: S) -> Self {
        Self::new(Some(client_id.into()), Some(client_secret.into()))
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[censored]"))
            .finish()
    }
}

/// Account identity for the scripted user login.
#[derive(Clone, Default)]
pub struct Account {
    pub user_id: Option<String>,
    pub password: Option<String>,
}

impl Account {
    pub fn new(user_id: Option<String>, password: Option<String>) -> Self {
        Self { user_id, password }
    }

    pub fn from_pair<U: Into<String>, P: Into<String>>(user_id: U, password: P) -> Self {
        Self::new(Some(user_id.into()), Some(password.into()))
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("user_id", &self.user_id)
            .field("password", &self.password.as_ref().map(|_| "[censored]"))
            .finish()
    }
}

/// Body of a successful token endpoint response.
///
/// Both fields are optional here so that a missing field is reported as an
/// authentication error rather than a decoding error.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Token returned by an interactive authorizer.
///
/// `expires_in` is `None` when the flow does not report a lifetime.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizedToken {
    pub access_token: String,
    pub expires_in: Option<u64>,
}

impl fmt::Debug for AuthorizedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedToken")
            .field("access_token", &"[censored]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// What the OAuth callback reported for a pending authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Code(String),
    Denied(String),
}

/// Authorization awaiting its callback.
#[derive(Debug, Clone)]
pub struct PkceSession {
    pub state: String,
    pub outcome: Option<CallbackOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchType {
    Album,
    Artist,
    Playlist,
    Track,
    Show,
    Episode,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Album => "album",
            SearchType::Artist => "artist",
            SearchType::Playlist => "playlist",
            SearchType::Track => "track",
            SearchType::Show => "show",
            SearchType::Episode => "episode",
        }
    }
}

impl std::str::FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "album" => Ok(SearchType::Album),
            "artist" => Ok(SearchType::Artist),
            "playlist" => Ok(SearchType::Playlist),
            "track" => Ok(SearchType::Track),
            "show" => Ok(SearchType::Show),
            "episode" => Ok(SearchType::Episode),
            other => Err(format!("unknown search type: {}", other)),
        }
    }
}

/// Operator narrowing a search, e.g. `love NOT queen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOperator {
    Not,
    Or,
}

impl SearchOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOperator::Not => "NOT",
            SearchOperator::Or => "OR",
        }
    }
}

impl std::str::FromStr for SearchOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "not" => Ok(SearchOperator::Not),
            "or" => Ok(SearchOperator::Or),
            other => Err(format!("unknown search operator: {}", other)),
        }
    }
}

/// Field filters of a search query.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track: Option<String>,
    pub playlist: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    /// Appended after the filters as ` NOT <term>` or ` OR <term>`.
    pub operator: Option<(SearchOperator, String)>,
}

impl SearchQuery {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Query matching the track name only (`track:<name>`).
    pub fn track<S: Into<String>>(name: S) -> Self {
        Self {
            track: Some(name.into()),
            ..Default::default()
        }
    }

    /// Query matching the playlist name only (`playlist:<name>`).
    pub fn playlist<S: Into<String>>(name: S) -> Self {
        Self {
            playlist: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_operator<S: Into<String>>(mut self, operator: SearchOperator, term: S) -> Self {
        self.operator = Some((operator, term.into()));
        self
    }

    /// Renders the `q` parameter, e.g. `love artist:queen year:1975 NOT live`.
    pub fn to_query_string(&self) -> String {
        let mut query = self.filters().join(" ");
        if let Some((operator, term)) = &self.operator {
            if !term.trim().is_empty() {
                query = format!("{} {} {}", query, operator.as_str(), term);
            }
        }
        query
    }

    /// True when there is nothing to search for. An operator alone does not
    /// count.
    pub fn is_empty(&self) -> bool {
        self.filters().join(" ").trim().is_empty()
    }

    fn filters(&self) -> Vec<String> {
        let mut parts: Vec<String> = Vec::new();
        if let Some(text) = &self.text {
            parts.push(text.clone());
        }
        let filters = [
            ("artist", &self.artist),
            ("album", &self.album),
            ("track", &self.track),
            ("playlist", &self.playlist),
            ("year", &self.year),
            ("genre", &self.genre),
        ];
        for (name, value) in filters {
            if let Some(value) = value {
                parts.push(format!("{}:{}", name, value));
            }
        }
        parts
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistOptions {
    pub public: bool,
    pub collaborative: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackUri {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackUri>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}
