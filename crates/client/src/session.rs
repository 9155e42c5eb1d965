//! Session token lifecycle.
//!
//! The source issues short-lived session tokens (valid ~60 minutes)
//! minted from a long-lived access token. Tokens are cached with a
//! safety margin so a token is never used close to expiry.

use chrono::{DateTime, Duration, Utc};

/// Stated server-side token validity.
const TOKEN_VALIDITY_MINUTES: i64 = 60;

/// Refresh this long before the stated expiry.
const REFRESH_MARGIN_MINUTES: i64 = 5;

/// Cached session token with its local expiry.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Creates an empty (unauthenticated) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token when it is still comfortably valid.
    #[must_use]
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<&str> {
        match (&self.token, self.expires_at) {
            (Some(token), Some(expires_at)) if now < expires_at => Some(token.as_str()),
            _ => None,
        }
    }

    /// Stores a freshly minted token, expiring it early by the margin.
    pub fn store(&mut self, token: String, now: DateTime<Utc>) {
        self.token = Some(token);
        self.expires_at =
            Some(now + Duration::minutes(TOKEN_VALIDITY_MINUTES - REFRESH_MARGIN_MINUTES));
    }

    /// Drops the cached token (e.g. after a 401).
    pub fn invalidate(&mut self) {
        self.token = None;
        self.expires_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_has_no_token() {
        let state = SessionState::new();
        assert!(state.valid_token(Utc::now()).is_none());
    }

    #[test]
    fn test_token_valid_within_margin() {
        let now = Utc::now();
        let mut state = SessionState::new();
        state.store("tok".into(), now);

        assert_eq!(state.valid_token(now), Some("tok"));
        // Still fine 50 minutes in.
        assert_eq!(state.valid_token(now + Duration::minutes(50)), Some("tok"));
        // Expired at the 55-minute mark, 5 minutes before server expiry.
        assert!(state.valid_token(now + Duration::minutes(55)).is_none());
    }

    #[test]
    fn test_invalidate_drops_token() {
        let now = Utc::now();
        let mut state = SessionState::new();
        state.store("tok".into(), now);
        state.invalidate();

        assert!(state.valid_token(now).is_none());
    }
}
