//! Bearer token verification.
//!
//! Tokens are HS256 JWTs minted by the auth provider. Verification turns
//! them into a [`CallerIdentity`]; nothing else about the session is kept.

use battlebucks::CallerIdentity;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims carried by access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Auth provider user ID
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Token errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Token has an empty subject")]
    EmptySubject,
}

/// Signs and verifies access tokens with a shared secret
#[derive(Clone)]
pub struct TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Decode a token into the caller it was issued to
    pub fn verify(&self, token: &str) -> Result<CallerIdentity, TokenError> {
        let token_data = decode::<AccessTokenClaims>(token, &self.decoding, &Validation::default())?;
        let claims = token_data.claims;

        if claims.sub.trim().is_empty() {
            return Err(TokenError::EmptySubject);
        }

        Ok(CallerIdentity {
            uid: claims.sub,
            email: claims.email,
            is_admin: claims.is_admin,
        })
    }

    /// Mint a token for `caller`, valid for `ttl`.
    ///
    /// Used by the `--issue-token` CLI flag and tests; production tokens
    /// come from the auth provider.
    pub fn issue(&self, caller: &CallerIdentity, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: caller.uid.clone(),
            email: caller.email.clone(),
            is_admin: caller.is_admin,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_testing_only_0123456789";

    #[test]
    fn test_issued_token_verifies_to_same_caller() {
        let verifier = TokenVerifier::new(SECRET);
        let caller = CallerIdentity::player("uid-7", "seven@example.com");

        let token = verifier.issue(&caller, Duration::minutes(15)).unwrap();
        assert_eq!(verifier.verify(&token).unwrap(), caller);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenVerifier::new(SECRET);
        let verifier = TokenVerifier::new("another_secret_key_that_is_long_enough_xx");

        let token = issuer
            .issue(&CallerIdentity::admin("admin-1"), Duration::minutes(15))
            .unwrap();
        assert!(matches!(verifier.verify(&token), Err(TokenError::Jwt(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = TokenVerifier::new(SECRET);
        let token = verifier
            .issue(&CallerIdentity::admin("admin-1"), Duration::hours(-2))
            .unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let verifier = TokenVerifier::new(SECRET);
        assert!(verifier.verify("not.a.jwt").is_err());
    }
}
