//! In-memory store implementations.
//!
//! Used by the test harness and local development. The maps live behind a
//! single async mutex per store, so check-and-insert is atomic and
//! concurrent duplicate registrations resolve the same way the Postgres
//! unique constraints do: one winner, one `Conflict`.

use crate::errors::AuthError;
use crate::models::{Account, Book, BookFilter, BookStatus, NewAccount, NewBook, Role};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-memory [`super::AccountStore`].
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn count(&self) -> usize {
        self.accounts.lock().await.len()
    }

    /// Remove an account. Accounts are never deleted through the service
    /// API; this exists so tests can exercise the valid-token,
    /// vanished-account paths.
    pub async fn remove(&self, account_id: Uuid) -> Option<Account> {
        self.accounts.lock().await.remove(&account_id)
    }

    /// Change an account's role, as an administrative actor would.
    pub async fn set_role(&self, account_id: Uuid, role: Role) -> bool {
        match self.accounts.lock().await.get_mut(&account_id) {
            Some(account) => {
                account.role = role;
                account.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl super::AccountStore for MemoryAccountStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AuthError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.values().find(|a| a.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<Account>, AuthError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(&account_id).cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, AuthError> {
        let mut accounts = self.accounts.lock().await;

        let taken = accounts
            .values()
            .any(|a| a.username == account.username || a.email == account.email);
        if taken {
            return Err(AuthError::Conflict(
                "An account with this username or email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let stored = Account {
            account_id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            display_name: account.display_name,
            password_hash: account.password_hash,
            role: account.role,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(stored.account_id, stored.clone());

        Ok(stored)
    }
}

/// In-memory [`super::BookStore`].
#[derive(Default)]
pub struct MemoryBookStore {
    books: Mutex<HashMap<Uuid, Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl super::BookStore for MemoryBookStore {
    async fn insert(&self, book: NewBook) -> Result<Book, AuthError> {
        let mut books = self.books.lock().await;

        let now = Utc::now();
        let stored = Book {
            book_id: Uuid::new_v4(),
            title: book.title,
            author_id: book.author_id,
            genre: book.genre,
            status: book.status,
            created_at: now,
            updated_at: now,
        };
        books.insert(stored.book_id, stored.clone());

        Ok(stored)
    }

    async fn find_by_id(&self, book_id: Uuid) -> Result<Option<Book>, AuthError> {
        let books = self.books.lock().await;
        Ok(books.get(&book_id).cloned())
    }

    async fn list(&self, filter: BookFilter) -> Result<Vec<Book>, AuthError> {
        let books = self.books.lock().await;

        let mut matched: Vec<Book> = books
            .values()
            .filter(|book| match filter {
                BookFilter::ByStatusAndAuthor { status, author_id } => {
                    book.status == status && book.author_id == author_id
                }
                BookFilter::ByStatus(status) => book.status == status,
                BookFilter::All => true,
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn set_status(
        &self,
        book_id: Uuid,
        status: BookStatus,
    ) -> Result<Option<Book>, AuthError> {
        let mut books = self.books.lock().await;

        Ok(books.get_mut(&book_id).map(|book| {
            book.status = status;
            book.updated_at = Utc::now();
            book.clone()
        }))
    }
}
