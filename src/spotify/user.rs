use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
    error::AuthError,
    info,
    management::{Credential, CredentialStore},
    spotify::{auth::TokenSource, authorizer::InteractiveAuthorizer},
};

/// Lifetime assumed for tokens whose flow does not report one.
///
/// The console page shows a token but not its expiry. A cached token is
/// treated as valid for this long even though the real token may expire
/// earlier or later.
pub const ASSUMED_TOKEN_TTL_SECS: u64 = 3600;

/// Obtains user-scoped tokens that allow writing to the account's playlists.
///
/// The cache is checked before the authorizer is invoked. Authorization opens
/// a browser and takes seconds, so it must only run when the stored token is
/// missing or expired. As with [`crate::spotify::auth::AppTokenProvider`], a
/// mutex around the check-then-refresh sequence keeps concurrent callers from
/// starting more than one authorization.
pub struct UserTokenProvider {
    authorizer: Arc<dyn InteractiveAuthorizer>,
    assumed_ttl: u64,
    store: Mutex<CredentialStore>,
}

impl UserTokenProvider {
    /// Creates a provider with an empty store.
    ///
    /// # Arguments
    ///
    /// * `authorizer` - Flow that obtains consent when the stored token is
    ///   missing or expired, e.g. [`ConsoleAuthorizer`] or
    ///   [`PkceAuthorizer`](crate::spotify::pkce::PkceAuthorizer)
    ///
    /// [`ConsoleAuthorizer`]: crate::spotify::authorizer::ConsoleAuthorizer
    pub fn new(authorizer: Arc<dyn InteractiveAuthorizer>) -> Self {
        Self {
            authorizer,
            assumed_ttl: ASSUMED_TOKEN_TTL_SECS,
            store: Mutex::new(CredentialStore::new()),
        }
    }

    /// Overrides [`ASSUMED_TOKEN_TTL_SECS`]. Zero is ignored.
    pub fn with_assumed_ttl(mut self, secs: u64) -> Self {
        if secs > 0 {
            self.assumed_ttl = secs;
        }
        self
    }

    pub fn assumed_ttl(&self) -> u64 {
        self.assumed_ttl
    }

    /// Returns a valid user token, running the authorizer only when the
    /// stored one is missing or expired.
    ///
    /// The current time is read after the store lock is acquired. A caller
    /// queued behind a slow authorization therefore checks the fresh token
    /// against the time it actually gets to look at it.
    ///
    /// # Errors
    ///
    /// Whatever the authorizer reports, unchanged, plus
    /// [`AuthError::Authentication`] when it hands back an empty token.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let provider = UserTokenProvider::new(Arc::new(ConsoleAuthorizer::from_config(launcher)));
    /// let token = provider.get_token().await?;
    /// ```
    pub async fn get_token(&self) -> Result<String, AuthError> {
        let mut store = self.store.lock().await;
        self.token_locked(&mut store, Utc::now()).await
    }

    /// Same as [`get_token`](Self::get_token) with an explicit current time.
    pub async fn get_token_at(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let mut store = self.store.lock().await;
        self.token_locked(&mut store, now).await
    }

    pub async fn credential(&self) -> Credential {
        self.store.lock().await.get()
    }

    pub async fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.store.lock().await.is_valid(now)
    }

    async fn token_locked(
        &self,
        store: &mut CredentialStore,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        if let Some(token) = store.valid_token(now) {
            return Ok(token);
        }

        let authorized = self.authorizer.authorize().await?;
        if authorized.access_token.is_empty() {
            return Err(AuthError::authentication(
                None,
                "authorizer returned an empty token",
            ));
        }

        // Prefer a lifetime reported by the flow; fall back to the assumption.
        let ttl = authorized
            .expires_in
            .filter(|secs| *secs > 0)
            .unwrap_or(self.assumed_ttl);
        info!("User token obtained, caching for {}s", ttl);
        store.set(authorized.access_token.clone(), ttl, now);

        Ok(authorized.access_token)
    }
}

#[async_trait]
impl TokenSource for UserTokenProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        self.get_token().await
    }
}
