//! Read-side decoding of the backend's session token.
//!
//! The backend signs tokens with a key the client never sees, so the client
//! only reads the payload: the signature is not checked here. Expiry is
//! checked by the caller against an explicit clock.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims the client reads from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the username.
    pub sub: String,
    /// Expiration time (Unix timestamp). Tokens without one never expire
    /// client-side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.exp {
            Some(exp) => exp.saturating_mul(1000) < now.timestamp_millis(),
            None => false,
        }
    }
}

/// Decodes the token payload without verifying its signature or expiry.
pub fn decode_unverified(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}
