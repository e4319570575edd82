//! Registration, login, and profile retrieval.
//!
//! Validation runs before any store access. Login treats an unknown
//! username and a wrong password identically in status, message, and
//! timing, so the endpoint is not an oracle for which handles exist.

use crate::config::Config;
use crate::crypto::password;
use crate::errors::AuthError;
use crate::models::{AccountResponse, AuthResponse, NewAccount, Role};
use crate::observability::metrics::{record_login, record_registration};
use crate::repositories::AccountStore;
use crate::services::token_service;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use uuid::Uuid;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Bcrypt digest verified when the username is unknown, so the missing
/// account path costs the same as a real verification.
const DUMMY_PASSWORD_HASH: &str = "$2a$10$QWfUPOtnUbzSMXYxW3d5du32cnZikgK8Rzj.QFglcb/sFG1hAAlVG";

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub display_name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Register a new account and issue its first token pair.
///
/// # Steps
///
/// 1. Validate username, email, password, display name
/// 2. Check the username and email are unused
/// 3. Hash the password
/// 4. Insert the account (role defaults to reader)
/// 5. Issue an access/refresh pair (auto-login)
pub async fn register(
    accounts: &dyn AccountStore,
    config: &Config,
    request: RegisterRequest,
) -> Result<AuthResponse, AuthError> {
    let username = request.username.trim();
    if username.is_empty() {
        record_registration("invalid");
        return Err(AuthError::Validation("Username cannot be empty".to_string()));
    }

    if !is_valid_email(&request.email) {
        record_registration("invalid");
        return Err(AuthError::Validation("Invalid email format".to_string()));
    }

    if request.password.expose_secret().len() < MIN_PASSWORD_LENGTH {
        record_registration("invalid");
        return Err(AuthError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let display_name = request.display_name.trim();
    if display_name.is_empty() {
        record_registration("invalid");
        return Err(AuthError::Validation(
            "Display name cannot be empty".to_string(),
        ));
    }

    // Pre-check for a friendly error on the common path. The store's own
    // uniqueness guarantee still decides concurrent races.
    if accounts.find_by_username(username).await?.is_some()
        || accounts.find_by_email(&request.email).await?.is_some()
    {
        record_registration("conflict");
        return Err(AuthError::Conflict(
            "An account with this username or email already exists".to_string(),
        ));
    }

    let password_hash = password::hash_password(request.password.expose_secret(), config.bcrypt_cost)?;

    let account = accounts
        .insert(NewAccount {
            username: username.to_string(),
            email: request.email.clone(),
            display_name: display_name.to_string(),
            password_hash,
            role: request.role.unwrap_or_default(),
        })
        .await
        .inspect_err(|e| {
            if matches!(e, AuthError::Conflict(_)) {
                record_registration("conflict");
            }
        })?;

    let tokens = token_service::issue_token_pair(config, &account)?;

    tracing::info!(target: "auth_service", role = %account.role, "Account registered");
    record_registration("success");

    Ok(AuthResponse::new(account, tokens))
}

/// Authenticate a username/password pair and issue a token pair.
pub async fn login(
    accounts: &dyn AccountStore,
    config: &Config,
    username: &str,
    password_input: &SecretString,
) -> Result<AuthResponse, AuthError> {
    let account = accounts.find_by_username(username).await?;

    // Always run bcrypt, against a dummy digest when the account is
    // missing, so the two failure cases are timing-indistinguishable.
    let hash_to_verify = match &account {
        Some(a) => a.password_hash.as_str(),
        None => DUMMY_PASSWORD_HASH,
    };
    let is_valid = password::verify_password(password_input.expose_secret(), hash_to_verify)?;

    let account = match account {
        Some(a) if is_valid => a,
        _ => {
            record_login("failure");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let tokens = token_service::issue_token_pair(config, &account)?;

    tracing::debug!(target: "auth_service", role = %account.role, "Login succeeded");
    record_login("success");

    Ok(AuthResponse::new(account, tokens))
}

/// Fetch the profile for a verified account id.
///
/// The id comes from verified token claims, never from client input. A
/// cryptographically valid token can outlive its account; that case is
/// `NotFound`, not trusted.
pub async fn get_profile(
    accounts: &dyn AccountStore,
    account_id: Uuid,
) -> Result<AccountResponse, AuthError> {
    let account = accounts
        .find_by_id(account_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    Ok(account.into())
}

/// Minimal email shape check: non-empty local part, domain with at least
/// one dot and no empty labels.
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }

    let (local, domain) = match (parts.first(), parts.get(1)) {
        (Some(l), Some(d)) => (*l, *d),
        _ => return false,
    };

    if local.is_empty() {
        return false;
    }

    let domain_parts: Vec<&str> = domain.split('.').collect();
    if domain_parts.len() < 2 {
        return false;
    }

    domain_parts.iter().all(|p| !p.is_empty())
}
