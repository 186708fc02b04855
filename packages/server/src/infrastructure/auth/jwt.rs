//! HS256 bearer token verification.
//!
//! The WebSocket handshake is not routed through request middleware, so the
//! handler calls [`JwtVerifier::verify`] itself before upgrading.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::UserId;

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token expired")]
    Expired,

    #[error("token invalid: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("token subject '{subject}' does not match user '{user_id}'")]
    SubjectMismatch { subject: String, user_id: String },

    #[error("failed to issue token: {0}")]
    Issue(jsonwebtoken::errors::Error),
}

/// Verifies (and, for collaborators, issues) HS256 access tokens
#[derive(Clone)]
pub struct JwtVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier").finish_non_exhaustive()
    }
}

impl JwtVerifier {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Validate signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid(e),
            })
    }

    /// Validate `token` and require its subject to be `user_id`.
    pub fn verify_for(&self, token: &str, user_id: &UserId) -> Result<Claims, AuthError> {
        let claims = self.verify(token)?;
        if claims.sub != user_id.as_str() {
            return Err(AuthError::SubjectMismatch {
                subject: claims.sub,
                user_id: user_id.as_str().to_string(),
            });
        }
        Ok(claims)
    }

    /// Issue a token for `user_id` valid for `ttl_secs` seconds.
    pub fn issue(&self, user_id: &UserId, ttl_secs: i64) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.as_str().to_string(),
            iat: now,
            exp: now + ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Issue)
    }
}
