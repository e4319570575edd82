//! End-to-end tests for the authentication flow.
//!
//! Exercises the real router over HTTP: registration, login, refresh,
//! profile, and the access guard's failure modes.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bookcircle_test_utils::{
    decode_payload, TestServer, TestTokenBuilder, TokenAssertions, TEST_ACCESS_SECRET,
    TEST_REFRESH_SECRET,
};
use bookcircle_service::models::Role;
use bookcircle_service::repositories::AccountStore;
use reqwest::StatusCode;
use serde_json::json;

fn register_body(username: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "password": "hunter22",
        "display_name": "Alice"
    })
}

// ============================================================================
// Registration
// ============================================================================

/// Happy path: a new account registers, the role defaults to reader, and
/// the response carries a working token pair.
#[tokio::test]
async fn test_register_happy_path() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestServer::spawn().await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/api/auth/register", server.url()))
        .json(&register_body("alice"))
        .send()
        .await?;

    // Assert
    assert_eq!(
        response.status(),
        StatusCode::CREATED,
        "Registration should succeed"
    );

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["account"]["username"].as_str(), Some("alice"));
    assert_eq!(body["account"]["role"].as_str(), Some("reader"));
    assert_eq!(body["token_type"].as_str(), Some("Bearer"));
    assert!(body["expires_in"].as_u64().unwrap_or(0) > 0);

    let access_token = body["access_token"]
        .as_str()
        .expect("Response should include access_token")
        .to_string();
    access_token.assert_valid_jwt().assert_role("reader");

    assert!(
        body["refresh_token"].as_str().is_some(),
        "Response should include refresh_token"
    );

    // The plaintext password never appears in any stored record.
    let stored = server
        .accounts()
        .find_by_username("alice")
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?
        .expect("Account should be stored");
    assert_ne!(stored.password_hash, "hunter22");

    Ok(())
}

/// Registering a taken username is a 400 Conflict and does not change the
/// store's record count.
#[tokio::test]
async fn test_register_duplicate_username_conflict() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let first = server
        .client()
        .post(format!("{}/api/auth/register", server.url()))
        .json(&register_body("alice"))
        .send()
        .await?;
    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(server.accounts().count().await, 1);

    let second = server
        .client()
        .post(format!("{}/api/auth/register", server.url()))
        .json(&register_body("alice"))
        .send()
        .await?;

    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = second.json().await?;
    assert_eq!(body["error"]["code"].as_str(), Some("CONFLICT"));
    assert_eq!(server.accounts().count().await, 1);

    Ok(())
}

/// Validation failures are caught before any store access.
#[tokio::test]
async fn test_register_validation_errors() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let cases = [
        json!({"username": "alice", "email": "not-an-email", "password": "hunter22", "display_name": "Alice"}),
        json!({"username": "alice", "email": "alice@example.com", "password": "short", "display_name": "Alice"}),
        json!({"username": "  ", "email": "alice@example.com", "password": "hunter22", "display_name": "Alice"}),
    ];

    for body in cases {
        let response = server
            .client()
            .post(format!("{}/api/auth/register", server.url()))
            .json(&body)
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let parsed: serde_json::Value = response.json().await?;
        assert_eq!(parsed["error"]["code"].as_str(), Some("VALIDATION_ERROR"));
    }

    assert_eq!(server.accounts().count().await, 0);

    Ok(())
}

// ============================================================================
// Login
// ============================================================================

/// Correct credentials yield tokens whose claims decode to the right
/// account id and role.
#[tokio::test]
async fn test_login_happy_path() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let account = server.seed_account("alice", "hunter22", Role::Reader).await?;

    let response = server
        .client()
        .post(format!("{}/api/auth/login", server.url()))
        .json(&json!({"username": "alice", "password": "hunter22"}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;

    let access_token = body["access_token"]
        .as_str()
        .expect("Response should include access_token")
        .to_string();
    access_token
        .assert_valid_jwt()
        .assert_role("reader")
        .assert_for_subject(&account.account_id.to_string());

    Ok(())
}

/// Wrong password and unknown username are indistinguishable: same
/// status, same code, same message.
#[tokio::test]
async fn test_login_failures_indistinguishable() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    server.seed_account("alice", "hunter22", Role::Reader).await?;

    let wrong_password = server
        .client()
        .post(format!("{}/api/auth/login", server.url()))
        .json(&json!({"username": "alice", "password": "wrong"}))
        .send()
        .await?;
    let unknown_user = server
        .client()
        .post(format!("{}/api/auth/login", server.url()))
        .json(&json!({"username": "mallory", "password": "hunter22"}))
        .send()
        .await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let wrong_body: serde_json::Value = wrong_password.json().await?;
    let unknown_body: serde_json::Value = unknown_user.json().await?;
    assert_eq!(wrong_body, unknown_body, "The two failures must be identical");
    assert_eq!(
        wrong_body["error"]["code"].as_str(),
        Some("INVALID_CREDENTIALS")
    );

    Ok(())
}

// ============================================================================
// Refresh
// ============================================================================

/// A refresh token mints a new access token that works on protected
/// routes. Refresh tokens are not rotated.
#[tokio::test]
async fn test_refresh_flow() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    server.seed_account("alice", "hunter22", Role::Reader).await?;

    let login: serde_json::Value = server
        .client()
        .post(format!("{}/api/auth/login", server.url()))
        .json(&json!({"username": "alice", "password": "hunter22"}))
        .send()
        .await?
        .json()
        .await?;
    let refresh_token = login["refresh_token"].as_str().expect("refresh token");

    let refreshed = server
        .client()
        .post(format!("{}/api/auth/refresh", server.url()))
        .json(&json!({"refresh_token": refresh_token}))
        .send()
        .await?;
    assert_eq!(refreshed.status(), StatusCode::OK);

    let body: serde_json::Value = refreshed.json().await?;
    let new_access = body["access_token"].as_str().expect("new access token");
    assert!(body.get("refresh_token").is_none(), "No rotation");

    // The minted token is accepted by the guard.
    let profile = server
        .client()
        .get(format!("{}/api/auth/profile", server.url()))
        .bearer_auth(new_access)
        .send()
        .await?;
    assert_eq!(profile.status(), StatusCode::OK);

    Ok(())
}

/// An access token is not accepted on the refresh endpoint: the secret
/// domains are independent.
#[tokio::test]
async fn test_refresh_rejects_access_token() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    server.seed_account("alice", "hunter22", Role::Reader).await?;

    let login: serde_json::Value = server
        .client()
        .post(format!("{}/api/auth/login", server.url()))
        .json(&json!({"username": "alice", "password": "hunter22"}))
        .send()
        .await?
        .json()
        .await?;
    let access_token = login["access_token"].as_str().expect("access token");

    let response = server
        .client()
        .post(format!("{}/api/auth/refresh", server.url()))
        .json(&json!({"refresh_token": access_token}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"].as_str(), Some("INVALID_TOKEN"));

    Ok(())
}

/// A refresh token for a since-deleted account is rejected even though
/// its signature is still valid.
#[tokio::test]
async fn test_refresh_for_deleted_account_rejected() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let account = server.seed_account("alice", "hunter22", Role::Reader).await?;

    let refresh_token = TestTokenBuilder::new()
        .for_account(account.account_id)
        .with_username("alice")
        .expires_in(3600)
        .sign(TEST_REFRESH_SECRET);

    server.accounts().remove(account.account_id).await;

    let response = server
        .client()
        .post(format!("{}/api/auth/refresh", server.url()))
        .json(&json!({"refresh_token": refresh_token}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

/// A role change lands in the next refreshed access token.
#[tokio::test]
async fn test_refresh_reflects_live_role() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let account = server.seed_account("alice", "hunter22", Role::Reader).await?;

    let refresh_token = TestTokenBuilder::new()
        .for_account(account.account_id)
        .with_username("alice")
        .with_role(Role::Reader)
        .expires_in(3600)
        .sign(TEST_REFRESH_SECRET);

    server.accounts().set_role(account.account_id, Role::Writer).await;

    let body: serde_json::Value = server
        .client()
        .post(format!("{}/api/auth/refresh", server.url()))
        .json(&json!({"refresh_token": refresh_token}))
        .send()
        .await?
        .json()
        .await?;

    let new_access = body["access_token"].as_str().expect("new access token");
    assert_eq!(
        decode_payload(new_access)["role"].as_str(),
        Some("writer"),
        "Refreshed token must carry the live role"
    );

    Ok(())
}

// ============================================================================
// Profile and the access guard
// ============================================================================

/// The profile endpoint returns the account without its password hash.
#[tokio::test]
async fn test_profile_happy_path() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let account = server.seed_account("alice", "hunter22", Role::Writer).await?;
    let token = server.access_token_for(&account);

    let response = server
        .client()
        .get(format!("{}/api/auth/profile", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["username"].as_str(), Some("alice"));
    assert_eq!(body["role"].as_str(), Some("writer"));
    assert!(body.get("password_hash").is_none());

    Ok(())
}

/// Missing or malformed Authorization headers fail closed.
#[tokio::test]
async fn test_guard_missing_or_malformed_header() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let missing = server
        .client()
        .get(format!("{}/api/auth/profile", server.url()))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let malformed = server
        .client()
        .get(format!("{}/api/auth/profile", server.url()))
        .header("Authorization", "Basic abc123")
        .send()
        .await?;
    assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

/// An expired access token is rejected with a distinguishable code so
/// clients can trigger the refresh flow.
#[tokio::test]
async fn test_guard_expired_token_distinguished() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let account = server.seed_account("alice", "hunter22", Role::Reader).await?;

    // The equivalent of a token minted 16 minutes ago with a 15-minute
    // TTL: its expiry instant is already in the past.
    let expired = TestTokenBuilder::new()
        .for_account(account.account_id)
        .with_username("alice")
        .expired_seconds_ago(60)
        .sign(TEST_ACCESS_SECRET);

    let response = server
        .client()
        .get(format!("{}/api/auth/profile", server.url()))
        .bearer_auth(&expired)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"].as_str(), Some("TOKEN_EXPIRED"));

    Ok(())
}

/// Forged or garbled tokens get the generic invalid-token response.
#[tokio::test]
async fn test_guard_invalid_token_generic() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;

    let forged = TestTokenBuilder::new().sign("wrong-secret-entirely-0123456789abcd");

    for token in [forged.as_str(), "garbage", ""] {
        let response = server
            .client()
            .get(format!("{}/api/auth/profile", server.url()))
            .bearer_auth(token)
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"]["code"].as_str(), Some("INVALID_TOKEN"));
    }

    Ok(())
}

/// A cryptographically valid token whose account no longer exists is 404:
/// checked, not assumed.
#[tokio::test]
async fn test_profile_vanished_account_not_found() -> Result<(), anyhow::Error> {
    let server = TestServer::spawn().await?;
    let account = server.seed_account("alice", "hunter22", Role::Reader).await?;
    let token = server.access_token_for(&account);

    server.accounts().remove(account.account_id).await;

    let response = server
        .client()
        .get(format!("{}/api/auth/profile", server.url()))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
