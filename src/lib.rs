//! Spotify Web API Client Library
//!
//! This library provides token management for the Spotify Web API and the
//! resource clients built on it. Two kinds of tokens are handled:
//!
//! - **App tokens** from the client-credentials grant, used for search,
//!   browse and reading playlists.
//! - **User tokens** obtained interactively, either by scripting the
//!   developer console in a remote-controlled browser or through an
//!   authorization-code flow with PKCE, used to modify playlists.
//!
//! Each provider owns its cached credential and refreshes it lazily, only
//! when a caller needs a token and the cached one is missing or expired.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `browser` - Scriptable browser capability and its WebDriver client
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error kinds reported by providers and clients
//! - `management` - Credential storage
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Token providers and Spotify Web API clients
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sptfy::spotify::{auth::AppTokenProvider, search::SearchClient};
//! use sptfy::types::{SearchQuery, SearchType};
//!
//! let app = Arc::new(AppTokenProvider::from_config());
//! let search = SearchClient::from_config(app);
//! let result = search
//!     .search(&SearchQuery::text("bohemian rhapsody"), &[SearchType::Track], Some(5))
//!     .await?;
//! ```

pub mod api;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// Status output goes to stderr so that command results on stdout stay
/// machine-readable.
///
/// # Example
///
/// ```rust,ignore
/// info!("Requesting app token");
/// info!("Found {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors in the binary. Library code returns errors instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
