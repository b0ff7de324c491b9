//! Confirmation tokens.
//!
//! A token is 32 bytes from the OS random source, encoded as URL-safe base64
//! without padding so it can be dropped straight into a link. Tokens are bound
//! to exactly one pending Lekka and are cleared when it leaves `Pending`.

use std::{fmt, sync::Arc};

use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};

const TOKEN_BYTES: usize = 32;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfirmationToken(String);

impl ConfirmationToken {
    /// Mint a fresh unguessable token.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Accepts only strings shaped like a minted token.
    ///
    /// Anything else cannot match a stored token, so callers treat `None` as
    /// an invalid link without touching the store.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(raw)
            .ok()?;
        (bytes.len() == TOKEN_BYTES).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfirmationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Keep tokens out of logs.
impl fmt::Debug for ConfirmationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfirmationToken(..)")
    }
}

/// Decides whether a still-pending token may be used.
///
/// A rejected token is reported exactly like an unknown one; the Lekka stays
/// pending and the state machine is untouched.
pub trait TokenPolicy: Send + Sync {
    fn accepts(&self, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool;
}

/// Tokens never expire.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExpiry;

impl TokenPolicy for NoExpiry {
    fn accepts(&self, _issued_at: DateTime<Utc>, _now: DateTime<Utc>) -> bool {
        true
    }
}

/// Tokens expire `max_age` after being issued.
#[derive(Clone, Copy, Debug)]
pub struct MaxAge(pub Duration);

impl TokenPolicy for MaxAge {
    fn accepts(&self, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(issued_at) <= self.0
    }
}

impl<T: TokenPolicy + ?Sized> TokenPolicy for Arc<T> {
    fn accepts(&self, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        (**self).accepts(issued_at, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_distinct_and_parse_back() {
        let a = ConfirmationToken::generate();
        let b = ConfirmationToken::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 43);
        assert_eq!(ConfirmationToken::parse(a.as_str()), Some(a));
    }

    #[test]
    fn parse_rejects_foreign_shapes() {
        assert_eq!(ConfirmationToken::parse(""), None);
        assert_eq!(ConfirmationToken::parse("abc"), None);
        assert_eq!(ConfirmationToken::parse("not/base64+url!"), None);
    }

    #[test]
    fn debug_hides_value() {
        let token = ConfirmationToken::generate();
        assert!(!format!("{token:?}").contains(token.as_str()));
    }

    #[test]
    fn max_age_rejects_stale_tokens() {
        let issued = Utc::now();
        let policy = MaxAge(Duration::hours(48));
        assert!(policy.accepts(issued, issued + Duration::hours(47)));
        assert!(!policy.accepts(issued, issued + Duration::hours(49)));
        assert!(NoExpiry.accepts(issued, issued + Duration::days(3650)));
    }
}
