use chrono::{DateTime, TimeDelta, Utc};

/// A bearer token together with the instant it stops being usable.
///
/// The token and its expiry are only ever present together.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Credential {
    #[default]
    Empty,
    Issued {
        token: String,
        expires_at: DateTime<Utc>,
    },
}

impl Credential {
    pub fn token(&self) -> Option<&str> {
        match self {
            Credential::Empty => None,
            Credential::Issued { token, .. } => Some(token),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Credential::Empty => None,
            Credential::Issued { expires_at, .. } => Some(*expires_at),
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        match self {
            Credential::Empty => false,
            Credential::Issued { expires_at, .. } => *expires_at > now,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Empty => f.write_str("Credential::Empty"),
            Credential::Issued { expires_at, .. } => f
                .debug_struct("Credential::Issued")
                .field("token", &"[censored]")
                .field("expires_at", expires_at)
                .finish(),
        }
    }
}

/// In-memory holder of one provider's [`Credential`].
///
/// Validity is recomputed on every query, never stored.
#[derive(Debug, Default)]
pub struct CredentialStore {
    credential: Credential,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Credential {
        self.credential.clone()
    }

    /// Replaces token and expiry at once, `expires_at = now + ttl_seconds`.
    pub fn set(&mut self, token: String, ttl_seconds: u64, now: DateTime<Utc>) {
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        let expires_at = now
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.credential = Credential::Issued { token, expires_at };
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.credential.is_valid(now)
    }

    /// The token if it is still valid at `now`.
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<String> {
        if self.is_valid(now) {
            self.credential.token().map(str::to_string)
        } else {
            None
        }
    }
}
