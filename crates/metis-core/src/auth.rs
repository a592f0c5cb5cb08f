//! Identity token verification
//!
//! Runs may carry an externally issued bearer token (Supabase-style HS256
//! JWT). This module's only job is to check the signature and expiry
//! against the shared signing secret and extract the owning-user
//! identifier. There is no password handling, session management or
//! credential storage here; the hosted platform owns all of that.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Token verification failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No bearer token on a request that requires one
    #[error("missing bearer token")]
    MissingToken,

    /// Token is structurally not a JWT or uses an unexpected algorithm
    #[error("malformed token")]
    Malformed,

    /// HMAC signature does not match
    #[error("invalid token signature")]
    InvalidSignature,

    /// `exp` claim is in the past
    #[error("token expired")]
    Expired,

    /// No usable `sub` claim
    #[error("token missing subject claim")]
    MissingSubject,

    /// Verification requested but no signing secret is configured
    #[error("token verification not configured")]
    NotConfigured,
}

/// Verified owner of a run
#[derive(Debug, Clone)]
pub struct UserIdentity {
    /// Opaque owning-user identifier (the token's `sub` claim)
    pub user_id: String,
    /// The original bearer token, forwarded to the storage backend so its
    /// row-level policies see the same identity
    pub token: String,
}

#[derive(Deserialize)]
struct Header {
    alg: String,
}

#[derive(Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Verifier for externally issued HS256 tokens
pub struct TokenVerifier {
    secret: Vec<u8>,
}

impl TokenVerifier {
    /// Create a verifier over the platform's signing secret
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into().into_bytes(),
        }
    }

    /// Verify a bearer token and extract the owning user
    ///
    /// # Errors
    /// Returns the specific [`AuthError`] for malformed tokens, signature
    /// mismatches, expired tokens and missing subjects.
    pub fn verify(&self, token: &str) -> Result<UserIdentity, AuthError> {
        let mut parts = token.split('.');
        let (header_b64, claims_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(c), Some(s), None) => (h, c, s),
                _ => return Err(AuthError::Malformed),
            };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| AuthError::Malformed)?;
        let header: Header =
            serde_json::from_slice(&header_bytes).map_err(|_| AuthError::Malformed)?;
        if header.alg != "HS256" {
            return Err(AuthError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::Malformed)?;

        // HMAC over "<header>.<claims>"; verify_slice is constant-time
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| AuthError::NotConfigured)?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidSignature)?;

        let claims_bytes = URL_SAFE_NO_PAD
            .decode(claims_b64)
            .map_err(|_| AuthError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&claims_bytes).map_err(|_| AuthError::Malformed)?;

        if let Some(exp) = claims.exp {
            if exp <= chrono::Utc::now().timestamp() {
                return Err(AuthError::Expired);
            }
        }

        let user_id = claims
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or(AuthError::MissingSubject)?;

        Ok(UserIdentity {
            user_id,
            token: token.to_string(),
        })
    }
}
