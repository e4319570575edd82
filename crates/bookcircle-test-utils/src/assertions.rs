//! Custom test assertions for expressive tests.
//!
//! Provides trait-based assertions for token validation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// JWT header structure.
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: Option<String>,
}

/// JWT claims structure, as this service mints them.
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Decode a token's payload into loose JSON, without verifying the
/// signature. For asserting on claims only.
pub fn decode_payload(token: &str) -> serde_json::Value {
    let parts: Vec<_> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "JWT must have 3 parts");

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        .expect("Invalid JWT payload encoding");
    serde_json::from_slice(&payload).expect("Failed to parse JWT payload JSON")
}

/// Custom assertions for tokens.
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_role("reader")
///     .assert_for_subject(&account_id.to_string());
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a structurally valid HS256 JWT.
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert the token's role claim.
    fn assert_role(&self, role: &str) -> &Self;

    /// Assert the token's subject claim.
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert that the token expires within the given number of seconds
    /// from now (and has not already expired).
    fn assert_expires_within(&self, seconds: i64) -> &Self;
}

fn parsed_claims(token: &str) -> JwtClaims {
    let parts: Vec<_> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "JWT must have 3 parts");

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        .expect("Invalid JWT payload encoding");
    serde_json::from_slice(&payload).expect("Failed to parse JWT claims JSON")
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header_bytes = URL_SAFE_NO_PAD
            .decode(parts[0])
            .expect("Failed to base64 decode JWT header");
        let header: JwtHeader =
            serde_json::from_slice(&header_bytes).expect("Failed to parse JWT header JSON");

        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ.as_deref(), Some("JWT"), "Expected JWT type");

        let claims = parsed_claims(self);
        assert!(!claims.sub.is_empty(), "sub claim must be present");
        assert!(!claims.username.is_empty(), "username claim must be present");
        assert!(claims.exp > claims.iat, "exp must be after iat");

        self
    }

    fn assert_role(&self, role: &str) -> &Self {
        let claims = parsed_claims(self);
        assert_eq!(
            claims.role, role,
            "Token role is '{}', expected '{}'",
            claims.role, role
        );
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = parsed_claims(self);
        assert_eq!(
            claims.sub, subject,
            "Token subject is '{}', expected '{}'",
            claims.sub, subject
        );
        self
    }

    fn assert_expires_within(&self, seconds: i64) -> &Self {
        let claims = parsed_claims(self);
        let now = chrono::Utc::now().timestamp();

        assert!(claims.exp > now, "Token is already expired");
        assert!(
            claims.exp <= now + seconds,
            "Token expires in {}s, expected within {}s",
            claims.exp - now,
            seconds
        );
        self
    }
}
