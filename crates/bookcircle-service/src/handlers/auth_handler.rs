use crate::config::Config;
use crate::crypto::token::Claims;
use crate::errors::AuthError;
use crate::models::{AccessTokenResponse, AccountResponse, AuthResponse};
use crate::repositories::{AccountStore, BookStore};
use crate::services::{auth_service, token_service};
use axum::{extract::State, http::StatusCode, Extension, Json};
use secrecy::SecretString;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

pub use crate::services::auth_service::RegisterRequest;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub books: Arc<dyn BookStore>,
    pub config: Config,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let response = auth_service::register(state.accounts.as_ref(), &state.config, payload).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = auth_service::login(
        state.accounts.as_ref(),
        &state.config,
        &payload.username,
        &payload.password,
    )
    .await?;

    Ok(Json(response))
}

/// POST /api/auth/refresh
///
/// Not behind the access guard: the refresh token in the body is the
/// credential, verified against the refresh secret.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>, AuthError> {
    let response = token_service::refresh_access_token(
        state.accounts.as_ref(),
        &state.config,
        &payload.refresh_token,
    )
    .await?;

    Ok(Json(response))
}

/// GET /api/auth/profile
///
/// The account id comes from the guard-verified claims. The account is
/// re-fetched: a valid token whose account has vanished is 404, not
/// trusted.
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AccountResponse>, AuthError> {
    let account_id = parse_subject(&claims)?;
    let account = auth_service::get_profile(state.accounts.as_ref(), account_id).await?;

    Ok(Json(account))
}

/// Parse the subject claim into an account id.
pub(crate) fn parse_subject(claims: &Claims) -> Result<Uuid, AuthError> {
    Uuid::parse_str(&claims.sub)
        .map_err(|_| AuthError::InvalidToken("Malformed subject claim".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_parse_subject() {
        let mut claims = Claims {
            sub: Uuid::from_u128(7).to_string(),
            username: "alice".to_string(),
            role: Role::Reader,
            iat: 0,
            exp: i64::MAX,
        };
        assert_eq!(parse_subject(&claims).ok(), Some(Uuid::from_u128(7)));

        claims.sub = "not-a-uuid".to_string();
        assert!(matches!(
            parse_subject(&claims),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request = LoginRequest {
            username: "alice".to_string(),
            password: SecretString::from("hunter22".to_string()),
        };

        let debug = format!("{:?}", request);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter22"));
    }
}
