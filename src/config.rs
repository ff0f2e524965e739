//! Configuration management for the Spotify client.
//!
//! Values are read from environment variables, optionally seeded from a `.env`
//! file in the local data directory. The configuration system follows a
//! hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! Credentials have no default. Their absence is reported by the token
//! providers as a configuration error before any request is made.

use std::{env, path::PathBuf};

use crate::{
    types::{Account, AppCredentials},
    warning,
};

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_CONSOLE_URL: &str = "https://developer.spotify.com/console/post-playlists/";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SCOPE: &str = "playlist-modify-public playlist-modify-private";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Loads the `.env` file from the local data directory.
///
/// The directory is created on first use. A missing `.env` file is not an
/// error; the process environment still applies, and variables already set
/// in it take precedence over the file.
///
/// # Returns
///
/// `Ok(())` when the file was loaded or does not exist, otherwise a message
/// naming the file and the reason.
///
/// # Errors
///
/// - The data directory cannot be created
/// - The `.env` file exists but cannot be read or parsed
///
/// # Example
///
/// ```rust,ignore
/// if let Err(e) = config::load_env().await {
///     warning!("Cannot load environment file. Err: {}", e);
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

/// Returns the path of the `.env` file.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/sptfy/.env`
/// - macOS: `~/Library/Application Support/sptfy/.env`
/// - Windows: `%LOCALAPPDATA%/sptfy/.env`
pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sptfy/.env");
    path
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    var(name).unwrap_or_else(|| default.to_string())
}

/// Returns the Spotify API client ID for authentication.
///
/// Reads `SPOTIFY_API_AUTH_CLIENT_ID`, the client ID obtained when registering
/// the application with Spotify's developer platform.
///
/// # Returns
///
/// `None` when the variable is unset or blank. The token providers turn that
/// into a configuration error before any request is made.
///
/// # Example
///
/// ```rust,ignore
/// let client_id = spotify_client_id(); // e.g., Some("abc123...")
/// ```
pub fn spotify_client_id() -> Option<String> {
    var("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Returns the Spotify API client secret from `SPOTIFY_API_AUTH_CLIENT_SECRET`.
///
/// # Returns
///
/// `None` when the variable is unset or blank.
pub fn spotify_client_secret() -> Option<String> {
    var("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Bundles client ID and secret for the client-credentials grant.
///
/// # Example
///
/// ```rust,ignore
/// let provider = AppTokenProvider::new(config::app_credentials());
/// ```
pub fn app_credentials() -> AppCredentials {
    AppCredentials::new(spotify_client_id(), spotify_client_secret())
}

/// Returns the Spotify user ID from `SPOTIFY_USER_ID`.
///
/// Used to log into the developer console and as the owner of created
/// playlists.
///
/// # Example
///
/// ```rust,ignore
/// let user_id = spotify_user(); // e.g., Some("username")
/// ```
pub fn spotify_user() -> Option<String> {
    var("SPOTIFY_USER_ID")
}

/// Returns the account password from `SPOTIFY_PASSWORD`.
pub fn spotify_password() -> Option<String> {
    var("SPOTIFY_PASSWORD")
}

/// Bundles user ID and password for the console login.
pub fn account() -> Account {
    Account::new(spotify_user(), spotify_password())
}

/// Returns the token endpoint URL.
///
/// Reads `SPOTIFY_API_TOKEN_URL`, falling back to [`DEFAULT_TOKEN_URL`].
///
/// # Example
///
/// ```rust,ignore
/// let url = spotify_apitoken_url(); // "https://accounts.spotify.com/api/token"
/// ```
pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Returns the authorization endpoint URL used by the PKCE flow.
///
/// Reads `SPOTIFY_API_AUTH_URL`, falling back to [`DEFAULT_AUTH_URL`].
pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Returns the Web API base URL.
///
/// Reads `SPOTIFY_API_URL`, falling back to [`DEFAULT_API_URL`]. All resource
/// client paths are appended to this URL.
///
/// # Example
///
/// ```rust,ignore
/// let url = format!("{}/search", spotify_apiurl());
/// ```
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Returns the developer console page scripted by the console login.
///
/// Reads `SPOTIFY_CONSOLE_URL`, falling back to [`DEFAULT_CONSOLE_URL`].
pub fn spotify_console_url() -> String {
    var_or("SPOTIFY_CONSOLE_URL", DEFAULT_CONSOLE_URL)
}

/// Returns the OAuth redirect URI for the PKCE flow.
///
/// Reads `SPOTIFY_API_REDIRECT_URI`. It must match one of the redirect URIs
/// registered for the application and point at [`server_addr`].
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Returns the space-separated scopes requested by the PKCE flow.
///
/// Reads `SPOTIFY_API_AUTH_SCOPE`, falling back to [`DEFAULT_SCOPE`].
pub fn spotify_scope() -> String {
    var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

/// Returns the address the local OAuth callback server binds to.
///
/// Reads `SERVER_ADDRESS`, falling back to [`DEFAULT_SERVER_ADDRESS`].
///
/// # Example
///
/// ```rust,ignore
/// let addr = server_addr(); // e.g., "127.0.0.1:8888"
/// ```
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Returns the WebDriver endpoint, e.g. a local `chromedriver`.
///
/// Reads `WEBDRIVER_URL`, falling back to [`DEFAULT_WEBDRIVER_URL`].
pub fn webdriver_url() -> String {
    var_or("WEBDRIVER_URL", DEFAULT_WEBDRIVER_URL)
}

/// Whether the console login runs the browser without a window.
///
/// Reads `BROWSER_HEADLESS`.
///
/// # Returns
///
/// `true` when unset. Values that are not a boolean (see [`parse_bool`])
/// produce a warning and also yield `true`.
pub fn browser_headless() -> bool {
    match var("BROWSER_HEADLESS") {
        None => true,
        Some(value) => parse_bool(&value).unwrap_or_else(|| {
            warning!("BROWSER_HEADLESS={} is not a boolean, using true", value);
            true
        }),
    }
}

/// Lifetime in seconds assumed for user tokens whose flow reports none.
///
/// Reads `USER_TOKEN_TTL`.
///
/// # Returns
///
/// The configured value when it is a positive integer, otherwise
/// [`ASSUMED_TOKEN_TTL_SECS`](crate::spotify::user::ASSUMED_TOKEN_TTL_SECS)
/// (with a warning if a value was set).
pub fn user_token_ttl() -> u64 {
    let default = crate::spotify::user::ASSUMED_TOKEN_TTL_SECS;
    match var("USER_TOKEN_TTL") {
        None => default,
        Some(value) => match value.parse::<u64>() {
            Ok(ttl) if ttl > 0 => ttl,
            _ => {
                warning!("USER_TOKEN_TTL={} is not a positive number, using {}", value, default);
                default
            }
        },
    }
}

/// Parses `true/false`, `1/0` and `yes/no`, case-insensitively.
///
/// # Arguments
///
/// * `value` - Raw value, surrounding whitespace is ignored
///
/// # Returns
///
/// `None` when the value is none of the accepted spellings.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
