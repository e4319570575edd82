//! Access guard for protected routes.
//!
//! Extracts the Bearer token from the Authorization header, verifies it
//! against the access secret, and injects the verified [`Claims`] into
//! request extensions. The guard fails closed: on any failure the
//! downstream handler never runs. Expired tokens are reported with a
//! distinguishable code so clients refresh instead of re-authenticating;
//! all other failures share one generic response.

use crate::crypto::token::{self, Claims};
use crate::errors::AuthError;
use crate::handlers::auth_handler::AppState;
use crate::models::Role;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// Extract the Bearer token from the Authorization header.
fn extract_bearer_token(req: &Request) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "middleware.auth", "Missing Authorization header");
            AuthError::InvalidToken("Missing Authorization header".to_string())
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "middleware.auth", "Invalid Authorization header format");
        AuthError::InvalidToken("Invalid Authorization header format".to_string())
    })
}

/// Authentication middleware for access tokens.
///
/// The embedded role is trusted for the access token's short lifetime;
/// refresh re-resolves it from the store.
#[instrument(skip_all, name = "middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AuthError> {
    let token = extract_bearer_token(&req)?;

    let claims = token::verify_token(token, &state.config.access_token_secret)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Role gate for handlers.
///
/// A handler declares the roles it accepts; callers outside the set get
/// `Forbidden` carrying both the required and actual roles.
pub fn authorize(claims: &Claims, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&claims.role) {
        return Ok(());
    }

    tracing::debug!(
        target: "middleware.auth",
        actual = %claims.role,
        "Role check failed"
    );

    Err(AuthError::Forbidden {
        required: allowed
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        actual: claims.role.to_string(),
    })
}
