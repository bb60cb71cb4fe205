use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

/// Claims
///
/// The identity payload carried inside a signed token. A value of this type only ever
/// comes from `TokenCodec::verify` (or is built by `claims_for` right before signing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the UUID of the user.
    pub sub: Uuid,
    /// Display name, so views can greet the user without a database read.
    pub name: String,
    pub email: String,
    /// Issued At (iat), seconds since the Unix epoch.
    pub iat: usize,
    /// Expiration Time (exp), seconds since the Unix epoch.
    pub exp: usize,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    /// True when the token was well-formed and correctly signed but past its `exp`.
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Invalid(e) if matches!(e.kind(), ErrorKind::ExpiredSignature))
    }
}

/// TokenCodec
///
/// Signs identity claims into opaque HS256 tokens and verifies them back. The keys are
/// derived once from the configured secret and shared (cheaply cloned) across requests.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// claims_for
    ///
    /// Builds the claim set for `user` as if issued at `issued_at` (seconds since epoch).
    pub fn claims_for(&self, user: &User, issued_at: u64) -> Claims {
        Claims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            iat: issued_at as usize,
            exp: issued_at.saturating_add(self.ttl_secs) as usize,
        }
    }

    /// sign
    ///
    /// Deterministic in (claims, secret). Two tokens for the same user differ only
    /// because their `iat`/`exp` differ.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(TokenError::Sign)
    }

    /// issue
    ///
    /// Signs a fresh token for `user`, stamped with the current time.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        self.sign(&self.claims_for(user, now))
    }

    /// verify
    ///
    /// Fails with `TokenError::Invalid` when the token is malformed, signed with another
    /// secret, or expired. Expiry is exact: no clock leeway past `exp`. Callers must
    /// check for an absent token themselves.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}
