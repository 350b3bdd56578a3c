//! Signed Admin Token
//!
//! `base64url(claims JSON) "." base64url(HMAC-SHA256(secret, first segment))`.
//! Claims use the wire names `isAdmin`, `sessionId`, `iat`, `exp`; times are
//! Unix seconds.

use platform::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub is_admin: bool,
    pub session_id: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn expires_at_ms(&self) -> i64 {
        self.exp * 1000
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Bad token signature")]
    BadSignature,
    #[error("Token expired")]
    Expired,
}

/// Signs and verifies tokens with one server-held secret
#[derive(Clone)]
pub struct TokenSigner {
    secret: [u8; 32],
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenSigner {
    pub fn new(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    pub fn sign(&self, claims: &TokenClaims) -> Result<String, serde_json::Error> {
        let payload = to_base64url(&serde_json::to_vec(claims)?);
        let signature = to_base64url(&hmac_sha256(&self.secret, payload.as_bytes()));
        Ok(format!("{payload}.{signature}"))
    }

    /// Check signature, then expiry against `now_ms`
    pub fn verify(&self, token: &str, now_ms: i64) -> Result<TokenClaims, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = from_base64url(signature).map_err(|_| TokenError::Malformed)?;

        if !verify_hmac_sha256(&self.secret, payload.as_bytes(), &signature) {
            return Err(TokenError::BadSignature);
        }

        let json = from_base64url(payload).map_err(|_| TokenError::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&json).map_err(|_| TokenError::Malformed)?;

        if now_ms >= claims.expires_at_ms() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
