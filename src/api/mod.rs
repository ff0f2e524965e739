//! # API Module
//!
//! HTTP endpoints served by the local callback server while a PKCE
//! authorization is pending.
//!
//! - [`callback`] receives the redirect from the authorization server and
//!   records the authorization code for the waiting authorizer.
//! - [`health`] reports that the server is up.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use sptfy::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::SharedSession;
pub use callback::callback;
pub use health::health;
