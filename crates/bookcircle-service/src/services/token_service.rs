//! Token issuance and refresh.
//!
//! Access and refresh tokens carry the same claims but are signed with
//! independent secrets and different TTLs. Refresh re-fetches the account
//! so the new access token reflects the live role and so tokens for
//! since-deleted accounts are rejected.

use crate::config::Config;
use crate::crypto::token::{self, Claims};
use crate::errors::AuthError;
use crate::models::{AccessTokenResponse, Account, TokenPair};
use crate::observability::metrics::record_token_refresh;
use crate::repositories::AccountStore;
use chrono::Utc;
use uuid::Uuid;

const TOKEN_TYPE: &str = "Bearer";

fn claims_for(account: &Account, now: i64, ttl_seconds: i64) -> Claims {
    Claims {
        sub: account.account_id.to_string(),
        username: account.username.clone(),
        role: account.role,
        iat: now,
        exp: now + ttl_seconds,
    }
}

/// Issue an access/refresh pair for an account that has just proven its
/// identity (registration or login).
pub fn issue_token_pair(config: &Config, account: &Account) -> Result<TokenPair, AuthError> {
    let now = Utc::now().timestamp();

    let access_claims = claims_for(account, now, config.access_token_ttl_seconds);
    let access_token = token::sign_token(&access_claims, &config.access_token_secret)?;

    let refresh_claims = claims_for(account, now, config.refresh_token_ttl_seconds);
    let refresh_token = token::sign_token(&refresh_claims, &config.refresh_token_secret)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: config.access_token_ttl_seconds.unsigned_abs(),
    })
}

/// Mint a new access token from a refresh token.
///
/// The refresh token is verified against the refresh secret only, so an
/// access token can never be replayed here (and vice versa). The account
/// is re-read from the store: a role change propagates into the new access
/// token, and a deleted account invalidates its outstanding refresh
/// tokens. Refresh tokens are not rotated.
pub async fn refresh_access_token(
    accounts: &dyn AccountStore,
    config: &Config,
    refresh_token: &str,
) -> Result<AccessTokenResponse, AuthError> {
    let claims = token::verify_token(refresh_token, &config.refresh_token_secret).inspect_err(
        |_| record_token_refresh("error"),
    )?;

    let account_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        record_token_refresh("error");
        AuthError::InvalidToken("Malformed subject claim".to_string())
    })?;

    let account = accounts.find_by_id(account_id).await?.ok_or_else(|| {
        tracing::debug!(target: "token_service", "Refresh rejected: account no longer exists");
        record_token_refresh("error");
        AuthError::InvalidToken("Unknown account".to_string())
    })?;

    let now = Utc::now().timestamp();
    let access_claims = claims_for(&account, now, config.access_token_ttl_seconds);
    let access_token = token::sign_token(&access_claims, &config.access_token_secret)?;

    record_token_refresh("success");

    Ok(AccessTokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: config.access_token_ttl_seconds.unsigned_abs(),
    })
}
