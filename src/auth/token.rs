//! Session token issuing and validation.
//!
//! Identity claims travel inside an HS256-signed JWT; the server keeps no
//! session state. The signing secret has process lifetime, so rotating it
//! invalidates every outstanding token.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::User;

/// Issuer written into every token.
pub const TOKEN_ISSUER: &str = "vehicledb";

/// Default token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Session validation failures, distinguishable at the request boundary.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was presented at all.
    #[error("no session token presented")]
    Missing,

    /// The token is not a structurally valid JWT or its claims do not parse.
    #[error("malformed session token")]
    Malformed,

    /// The signature does not verify against the current secret.
    #[error("session token signature is invalid")]
    InvalidSignature,

    /// The token was valid once but its expiry has passed.
    #[error("session token is expired")]
    Expired,
}

/// Identity claims carried inside a signed session token.
///
/// Never persisted; reconstructed by decoding on every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User's email address.
    pub email_address: String,
    /// Subject: the user's row id.
    pub sub: i64,
    /// Issuer.
    pub iss: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Issues and validates signed session tokens.
///
/// Pure function of its inputs plus the construction-time secret; holds no
/// mutable state and is shared across request workers by `Arc`.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec from the server-held symmetric secret.
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked manually against an injectable clock, with no
        // leeway: a token is valid only while `exp` is strictly in the
        // future.
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            validation,
        }
    }

    /// Issue a signed token for a user, expiring `ttl` from now.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now().timestamp())
    }

    /// Issue a signed token with an explicit clock.
    pub fn issue_at(&self, user: &User, now: i64) -> Result<String, AuthError> {
        let claims = Claims {
            email_address: user.email_address.clone(),
            sub: user.user_id,
            iss: TOKEN_ISSUER.to_string(),
            exp: now + self.ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("failed to sign session token: {e}");
            AuthError::Malformed
        })
    }

    /// Validate a presented token and recover its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate with an explicit clock.
    ///
    /// Checks run in order: signature, claim shape, expiry. Each failure is
    /// a distinct [`AuthError`]. Never mutates state.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            }
        })?;

        if data.claims.exp <= now {
            return Err(AuthError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            user_id: 7,
            email_address: "a@b.com".to_string(),
            password_hash: String::new(),
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret", DEFAULT_TOKEN_TTL_SECS)
    }

    #[test]
    fn issue_then_validate_recovers_identity() {
        let codec = codec();
        let now = Utc::now().timestamp();

        let token = codec.issue_at(&test_user(), now).unwrap();
        let claims = codec.validate_at(&token, now).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email_address, "a@b.com");
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp, now + DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn token_expires_strictly_after_ttl() {
        let codec = codec();
        let now = 1_700_000_000;
        let token = codec.issue_at(&test_user(), now).unwrap();

        // One second before expiry: still valid.
        assert!(codec
            .validate_at(&token, now + DEFAULT_TOKEN_TTL_SECS - 1)
            .is_ok());

        // At expiry and beyond: expired.
        assert_eq!(
            codec.validate_at(&token, now + DEFAULT_TOKEN_TTL_SECS),
            Err(AuthError::Expired)
        );
        assert_eq!(
            codec.validate_at(&token, now + DEFAULT_TOKEN_TTL_SECS + 1),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let token = codec.issue_at(&test_user(), now).unwrap();

        // Flip one character in the signature segment.
        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(
            codec.validate_at(&tampered, now),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let now = Utc::now().timestamp();
        let token = TokenCodec::new("secret-one", DEFAULT_TOKEN_TTL_SECS)
            .issue_at(&test_user(), now)
            .unwrap();

        let other = TokenCodec::new("secret-two", DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(
            other.validate_at(&token, now),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_token_is_malformed() {
        let codec = codec();
        let now = Utc::now().timestamp();

        assert_eq!(codec.validate_at("", now), Err(AuthError::Malformed));
        assert_eq!(
            codec.validate_at("not.a.jwt", now),
            Err(AuthError::Malformed)
        );
        assert_eq!(
            codec.validate_at("only-one-segment", now),
            Err(AuthError::Malformed)
        );
    }

    #[test]
    fn expired_token_with_bad_signature_reports_signature_first() {
        let codec = codec();
        let now = 1_700_000_000;
        let token = codec.issue_at(&test_user(), now).unwrap();

        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(
            codec.validate_at(&tampered, now + 2 * DEFAULT_TOKEN_TTL_SECS),
            Err(AuthError::InvalidSignature)
        );
    }
}
