use crate::errors::AuthError;
use crate::models::{Account, NewAccount, Role};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

/// Narrow contract the auth service holds on account persistence.
///
/// Uniqueness of username and email under concurrent inserts is the
/// implementation's responsibility; the losing writer gets `Conflict`.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Account>, AuthError>;

    /// Persist a new account. Returns `Conflict` if the username or email
    /// is already taken.
    async fn insert(&self, account: NewAccount) -> Result<Account, AuthError>;
}

/// Row type for the accounts table. Role is stored as text and converted
/// on the way out so an unexpected value surfaces as a store error instead
/// of a decode panic.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    username: String,
    email: String,
    display_name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> Result<Account, AuthError> {
        let role = Role::from_str(&self.role)
            .map_err(|_| AuthError::Database(format!("Unknown role in store: {}", self.role)))?;

        Ok(Account {
            account_id: self.account_id,
            username: self.username,
            email: self.email,
            display_name: self.display_name,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Postgres-backed account store.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ACCOUNT_COLUMNS: &str = "account_id, username, email, display_name, password_hash, role, \
                               created_at, updated_at";

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE username = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to fetch account by username: {}", e)))?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to fetch account by email: {}", e)))?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE account_id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to fetch account by id: {}", e)))?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO accounts (username, email, display_name, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Concurrent registrations race here; the unique constraints
            // resolve the winner and the loser sees a violation.
            let message = e.to_string();
            if message.contains("accounts_username_unique") || message.contains("accounts_email_unique") {
                AuthError::Conflict(
                    "An account with this username or email already exists".to_string(),
                )
            } else {
                AuthError::Database(format!("Failed to create account: {}", e))
            }
        })?;

        row.into_account()
    }
}
