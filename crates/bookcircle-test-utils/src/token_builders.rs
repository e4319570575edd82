//! Builder patterns for test data construction.
//!
//! Provides a fluent API for creating signed test tokens, including ones
//! that are already expired or signed with the wrong secret.

use bookcircle_service::crypto::token::Claims;
use bookcircle_service::models::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use uuid::Uuid;

/// Builder for test tokens.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_account(TEST_ACCOUNT_ALICE)
///     .with_role(Role::Admin)
///     .expires_in(3600)
///     .sign(TEST_ACCESS_SECRET);
/// ```
pub struct TestTokenBuilder {
    sub: String,
    username: String,
    role: Role,
    iat: i64,
    exp: i64,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults: a reader token valid for
    /// one hour.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: Uuid::from_u128(100).to_string(),
            username: "test-subject".to_string(),
            role: Role::Reader,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(3600)).timestamp(),
        }
    }

    /// Set the subject account id.
    pub fn for_account(mut self, account_id: Uuid) -> Self {
        self.sub = account_id.to_string();
        self
    }

    /// Set the username claim.
    pub fn with_username(mut self, username: &str) -> Self {
        self.username = username.to_string();
        self
    }

    /// Set the role claim.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set expiration in seconds from now.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Make the token already expired, by the given number of seconds.
    /// `iat` is pushed back accordingly so the claims stay coherent.
    pub fn expired_seconds_ago(mut self, seconds: i64) -> Self {
        let now = Utc::now().timestamp();
        self.exp = now - seconds;
        self.iat = self.exp - 900;
        self
    }

    /// Set the issued-at timestamp.
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    /// Build the claims without signing.
    pub fn build(self) -> Claims {
        Claims {
            sub: self.sub,
            username: self.username,
            role: self.role,
            iat: self.iat,
            exp: self.exp,
        }
    }

    /// Build and sign with the given secret (HS256).
    pub fn sign(self, secret: &str) -> String {
        let claims = self.build();
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("test token signing should succeed")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
