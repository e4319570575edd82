use crate::errors::AuthError;
use crate::models::{Book, BookFilter, BookStatus, NewBook};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

/// Book metadata persistence, as seen by the role-gated handlers.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn insert(&self, book: NewBook) -> Result<Book, AuthError>;

    async fn find_by_id(&self, book_id: Uuid) -> Result<Option<Book>, AuthError>;

    async fn list(&self, filter: BookFilter) -> Result<Vec<Book>, AuthError>;

    /// Set a book's status. Returns the updated book, or `None` when the
    /// book does not exist.
    async fn set_status(
        &self,
        book_id: Uuid,
        status: BookStatus,
    ) -> Result<Option<Book>, AuthError>;
}

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    book_id: Uuid,
    title: String,
    author_id: Uuid,
    genre: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookRow {
    fn into_book(self) -> Result<Book, AuthError> {
        let status = BookStatus::from_str(&self.status).map_err(|_| {
            AuthError::Database(format!("Unknown book status in store: {}", self.status))
        })?;

        Ok(Book {
            book_id: self.book_id,
            title: self.title,
            author_id: self.author_id,
            genre: self.genre,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Postgres-backed book store.
#[derive(Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOK_COLUMNS: &str = "book_id, title, author_id, genre, status, created_at, updated_at";

#[async_trait]
impl BookStore for PgBookStore {
    async fn insert(&self, book: NewBook) -> Result<Book, AuthError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "INSERT INTO books (title, author_id, genre, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.genre)
        .bind(book.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to create book: {}", e)))?;

        row.into_book()
    }

    async fn find_by_id(&self, book_id: Uuid) -> Result<Option<Book>, AuthError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "SELECT {} FROM books WHERE book_id = $1",
            BOOK_COLUMNS
        ))
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to fetch book: {}", e)))?;

        row.map(BookRow::into_book).transpose()
    }

    async fn list(&self, filter: BookFilter) -> Result<Vec<Book>, AuthError> {
        let rows = match filter {
            BookFilter::ByStatusAndAuthor { status, author_id } => {
                sqlx::query_as::<_, BookRow>(&format!(
                    "SELECT {} FROM books WHERE status = $1 AND author_id = $2 \
                     ORDER BY created_at DESC",
                    BOOK_COLUMNS
                ))
                .bind(status.as_str())
                .bind(author_id)
                .fetch_all(&self.pool)
                .await
            }
            BookFilter::ByStatus(status) => {
                sqlx::query_as::<_, BookRow>(&format!(
                    "SELECT {} FROM books WHERE status = $1 ORDER BY created_at DESC",
                    BOOK_COLUMNS
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            BookFilter::All => {
                sqlx::query_as::<_, BookRow>(&format!(
                    "SELECT {} FROM books ORDER BY created_at DESC",
                    BOOK_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AuthError::Database(format!("Failed to list books: {}", e)))?;

        rows.into_iter().map(BookRow::into_book).collect()
    }

    async fn set_status(
        &self,
        book_id: Uuid,
        status: BookStatus,
    ) -> Result<Option<Book>, AuthError> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            "UPDATE books SET status = $2, updated_at = NOW() WHERE book_id = $1 \
             RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(book_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to update book status: {}", e)))?;

        row.map(BookRow::into_book).transpose()
    }
}
