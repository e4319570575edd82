use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Authorization level of an account.
///
/// Stored as lowercase text; the store constrains the same three values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Reader,
    Writer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Writer => "writer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reader" => Ok(Role::Reader),
            "writer" => Ok(Role::Writer),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Lifecycle status of a book. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Draft,
    Published,
    Finished,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Draft => "draft",
            BookStatus::Published => "published",
            BookStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(BookStatus::Draft),
            "published" => Ok(BookStatus::Published),
            "finished" => Ok(BookStatus::Finished),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

/// A registered account.
///
/// `password_hash` never leaves the service boundary; API responses use
/// [`AccountResponse`], which omits it.
#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to persist a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
}

/// Public view of an account (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub account_id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.account_id,
            username: account.username,
            email: account.email,
            display_name: account.display_name,
            role: account.role,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Book metadata. Content storage is out of scope; this is exactly what
/// the role-gated endpoints need.
#[derive(Debug, Clone, Serialize)]
pub struct Book {
    pub book_id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to persist a new book.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author_id: Uuid,
    pub genre: Option<String>,
    pub status: BookStatus,
}

/// Listing filter derived from the requested status and the caller's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookFilter {
    /// Books of one status belonging to one author.
    ByStatusAndAuthor { status: BookStatus, author_id: Uuid },
    /// All books of one status, regardless of author.
    ByStatus(BookStatus),
    /// Every book.
    All,
}

/// Access/refresh token pair returned by register and login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Response for the refresh endpoint: a new access token only. Refresh
/// tokens are not rotated.
#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Response for register and login: the account plus its token pair.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub account: AccountResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

impl AuthResponse {
    pub fn new(account: Account, tokens: TokenPair) -> Self {
        Self {
            account: account.into(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Reader, Role::Writer, Role::Admin] {
            assert_eq!(Role::from_str(role.as_str()).ok(), Some(role));
        }
        assert!(Role::from_str("superadmin").is_err());
        assert!(Role::from_str("").is_err());
    }

    #[test]
    fn test_role_default_is_reader() {
        assert_eq!(Role::default(), Role::Reader);
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Writer).ok().as_deref(), Some("\"writer\""));
        let parsed: Result<Role, _> = serde_json::from_str("\"admin\"");
        assert_eq!(parsed.ok(), Some(Role::Admin));
    }

    #[test]
    fn test_book_status_round_trip() {
        for status in [BookStatus::Draft, BookStatus::Published, BookStatus::Finished] {
            assert_eq!(BookStatus::from_str(status.as_str()).ok(), Some(status));
        }
        assert!(BookStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_account_response_has_no_password_hash() {
        let account = Account {
            account_id: Uuid::from_u128(1),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            display_name: "Alice".to_string(),
            password_hash: "$2a$10$secret".to_string(),
            role: Role::Reader,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let response: AccountResponse = account.into();
        let json = serde_json::to_string(&response).unwrap_or_default();

        assert!(json.contains("\"username\":\"alice\""));
        assert!(!json.contains("password"));
        assert!(!json.contains("$2a$10$"));
    }
}
