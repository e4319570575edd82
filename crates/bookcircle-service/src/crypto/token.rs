use crate::errors::AuthError;
use crate::models::Role;
use crate::observability::metrics::record_token_validation;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Maximum allowed token size in bytes (4KB).
///
/// Oversized tokens are rejected BEFORE base64 decoding or signature
/// verification. Typical tokens here are 300-400 bytes.
const MAX_TOKEN_SIZE_BYTES: usize = 4096;

/// Claims carried by both access and refresh tokens.
///
/// The two flavors differ only in TTL and signing secret; a refresh token
/// presented where an access token is expected fails signature
/// verification, so no extra type discriminator is needed.
///
/// `sub` and `username` identify a person and are redacted in Debug output.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    /// Login handle at issuance time.
    pub username: String,
    /// Role at issuance time. Trusted for the access token's short
    /// lifetime; refresh re-resolves it from the store.
    pub role: Role,
    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,
    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("username", &"[REDACTED]")
            .field("role", &self.role)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Sign claims with the given secret (HS256).
#[instrument(skip_all)]
pub fn sign_token(claims: &Claims, secret: &SecretString) -> Result<String, AuthError> {
    let encoding_key = EncodingKey::from_secret(secret.expose_secret().as_bytes());
    let header = Header::new(Algorithm::HS256);

    encode(&header, claims, &encoding_key)
        .map_err(|e| AuthError::Crypto(format!("Token signing failed: {}", e)))
}

/// Verify a token against the given secret, using the current clock.
///
/// Returns [`AuthError::ExpiredToken`] when the signature is good but the
/// token has expired, and [`AuthError::InvalidToken`] for every other
/// failure (bad signature, malformed token, wrong secret) with no further
/// detail.
pub fn verify_token(token: &str, secret: &SecretString) -> Result<Claims, AuthError> {
    verify_token_at(token, secret, Utc::now().timestamp())
}

/// Verify a token against the given secret at an explicit instant.
///
/// The expiry comparison is inclusive: a token checked at exactly its
/// `exp` instant is expired. Expiry is evaluated here, against `now`,
/// rather than inside the JWT library, so the boundary is a single
/// deterministic comparison.
#[instrument(skip_all)]
pub fn verify_token_at(
    token: &str,
    secret: &SecretString,
    now: i64,
) -> Result<Claims, AuthError> {
    // Size check before any parsing or cryptographic work.
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "crypto",
            token_size = token.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        record_token_validation("error", Some("oversized"));
        return Err(AuthError::InvalidToken("Token too large".to_string()));
    }

    let decoding_key = DecodingKey::from_secret(secret.expose_secret().as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked below against the caller-supplied clock; the
    // library check (with its default leeway) stays off.
    validation.validate_exp = false;

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "crypto", error = %e, "Token verification failed");
        record_token_validation("error", Some("invalid"));
        AuthError::InvalidToken("Signature verification failed".to_string())
    })?;

    if now >= token_data.claims.exp {
        tracing::debug!(
            target: "crypto",
            exp = token_data.claims.exp,
            now = now,
            "Token rejected: expired"
        );
        record_token_validation("error", Some("expired"));
        return Err(AuthError::ExpiredToken);
    }

    record_token_validation("success", None);
    Ok(token_data.claims)
}
