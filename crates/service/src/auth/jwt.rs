//! HS* JSON Web Tokens carrying the user id.

use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Clone)]
pub struct JwtSettings {
    secret: String,
    algorithm: Algorithm,
    ttl: Duration,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"***")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtSettings {
    pub fn new(secret: impl Into<String>, algorithm: &str, ttl_seconds: u64) -> Result<Self, AuthError> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|e| AuthError::TokenError(format!("unsupported algorithm {algorithm:?}: {e}")))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AuthError::TokenError(format!("{algorithm:?} is not an HMAC algorithm")));
        }
        let ttl_seconds = i64::try_from(ttl_seconds)
            .map_err(|_| AuthError::TokenError("token ttl out of range".into()))?;
        Ok(Self { secret: secret.into(), algorithm, ttl: Duration::seconds(ttl_seconds) })
    }

    /// Sign a token for `user_id`; returns the token and its expiry.
    pub fn sign(&self, user_id: Uuid) -> Result<(String, DateTime<Utc>), AuthError> {
        self.sign_at(user_id, Utc::now())
    }

    pub fn sign_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<(String, DateTime<Utc>), AuthError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            user_id,
            iat: now.timestamp().max(0) as u64,
            exp: expires_at.timestamp().max(0) as u64,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        let expires_at = Utc.timestamp_opt(claims.exp as i64, 0).single().unwrap_or(expires_at);
        Ok((token, expires_at))
    }

    /// Verify signature and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;
        decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}
