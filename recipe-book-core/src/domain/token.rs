//! Access token claims
//!
//! Tokens issued by the backend are JWT-shaped: `header.payload.signature`,
//! each part base64url encoded without padding. The client only reads the
//! payload to learn who is logged in and when the session ends; the signature
//! is the backend's business.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::User;

/// Header used for tokens minted by the mock backend
const UNSIGNED_HEADER: &str = r#"{"alg":"none","typ":"JWT"}"#;

/// Decoded access token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: u64,
    pub username: String,
    /// Expiry as unix seconds. Tokens without `exp` never expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl AccessToken {
    pub fn new(id: u64, username: impl Into<String>, exp: Option<i64>) -> Self {
        Self {
            id,
            username: username.into(),
            exp,
        }
    }

    /// Decode the claims of a token string
    pub fn decode(token: &str) -> Result<Self> {
        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next()) {
            (Some(_header), Some(payload)) if !payload.is_empty() => payload,
            _ => return Err(Error::Token("expected header.payload.signature".to_string())),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| Error::Token(format!("payload is not base64url: {}", e)))?;

        serde_json::from_slice(&bytes).map_err(|e| Error::Token(format!("bad claims: {}", e)))
    }

    /// Encode the claims as an unsigned JWT-shaped token
    pub fn encode_unsigned(&self) -> Result<String> {
        let payload = serde_json::to_vec(self)?;
        Ok(format!(
            "{}.{}.",
            URL_SAFE_NO_PAD.encode(UNSIGNED_HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        ))
    }

    /// Expiry instant, if the token carries one
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }

    /// Time left until expiry, clamped at zero. `None` when the token never expires.
    pub fn time_left(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        self.expires_at()
            .map(|expires_at| (expires_at - now).to_std().unwrap_or_default())
    }

    pub fn user(&self) -> User {
        User::new(self.id, self.username.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_encode_then_decode_claims() {
        let claims = AccessToken::new(3, "cook", Some(1_900_000_000));
        let token = claims.encode_unsigned().unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(AccessToken::decode(&token).unwrap(), claims);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(AccessToken::decode("").is_err());
        assert!(AccessToken::decode("not-a-token").is_err());
        assert!(AccessToken::decode("a.!!!.c").is_err());

        let not_claims = format!("x.{}.y", URL_SAFE_NO_PAD.encode(b"[1,2,3]"));
        assert!(AccessToken::decode(&not_claims).is_err());
    }

    #[test]
    fn test_decode_accepts_foreign_signed_tokens() {
        // Extra claims from a real backend are ignored
        let payload = URL_SAFE_NO_PAD.encode(br#"{"id":1,"username":"u","exp":10,"iat":1}"#);
        let token = format!("eyJhbGciOiJIUzI1NiJ9.{}.c2lnbmF0dXJl", payload);
        let claims = AccessToken::decode(&token).unwrap();
        assert_eq!(claims.exp, Some(10));
    }

    #[test]
    fn test_expiry_checks() {
        let now = Utc::now();
        let future = AccessToken::new(1, "u", Some((now + Duration::hours(1)).timestamp()));
        let past = AccessToken::new(1, "u", Some((now - Duration::seconds(1)).timestamp()));
        let forever = AccessToken::new(1, "u", None);

        assert!(!future.is_expired(now));
        assert!(past.is_expired(now));
        assert!(!forever.is_expired(now));

        assert!(future.time_left(now).unwrap().as_secs() > 3500);
        assert_eq!(past.time_left(now), Some(std::time::Duration::ZERO));
        assert_eq!(forever.time_left(now), None);
    }
}
