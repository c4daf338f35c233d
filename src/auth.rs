use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tokens are treated as stale this long before they actually expire
const EXPIRY_MARGIN_SECS: i64 = 300;
/// Lifetime assumed for tokens pasted without an explicit expiry
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Bearer token of the account linked on the video platform.
///
/// Obtaining the token (consent screen, refresh) happens outside Synapse;
/// this only stores it and knows when it stops being usable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkedToken {
    pub access_token: String,
    pub obtained_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl LinkedToken {
    pub fn new(access_token: impl Into<String>, lifetime_secs: Option<i64>) -> Self {
        let now = Utc::now();
        Self {
            access_token: access_token.into().trim().to_string(),
            obtained_at: now,
            expires_at: lifetime_secs.map(|secs| now + Duration::seconds(secs)),
        }
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh_at(Utc::now())
    }

    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(exp) => (exp - now).num_seconds() < EXPIRY_MARGIN_SECS,
            None => false,
        }
    }

    /// The token if it can still be sent
    pub fn usable(&self) -> Option<&str> {
        if self.access_token.is_empty() || self.needs_refresh() {
            None
        } else {
            Some(&self.access_token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_without_expiry_never_needs_refresh() {
        let token = LinkedToken::new("abc", None);
        assert!(!token.needs_refresh());
        assert_eq!(token.usable(), Some("abc"));
    }

    #[test]
    fn token_near_expiry_needs_refresh() {
        let token = LinkedToken::new("abc", Some(3600));
        let almost = token.expires_at.unwrap() - Duration::seconds(60);
        assert!(token.needs_refresh_at(almost));
        assert!(!token.needs_refresh_at(token.obtained_at));
    }

    #[test]
    fn expired_token_is_not_usable() {
        let token = LinkedToken::new("abc", Some(-10));
        assert!(token.usable().is_none());
    }

    #[test]
    fn whitespace_is_trimmed() {
        let token = LinkedToken::new("  ya29.token\n", None);
        assert_eq!(token.access_token, "ya29.token");
    }
}
