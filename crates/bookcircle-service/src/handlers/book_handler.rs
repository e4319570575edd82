//! Role-gated book endpoints.
//!
//! Books carry metadata only; what matters here is how visibility and
//! transitions branch on the caller's role:
//!
//! - drafts are visible to their author alone
//! - an admin listing `published` sees every published book
//! - `finished` books are visible to everyone
//! - creation requires writer or admin
//! - the terminal `finished` transition requires admin

use crate::crypto::token::Claims;
use crate::errors::AuthError;
use crate::handlers::auth_handler::{parse_subject, AppState};
use crate::middleware::auth::authorize;
use crate::models::{Book, BookFilter, BookStatus, NewBook, Role};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub status: Option<BookStatus>,
}

/// Compute the listing filter for a requested status and caller.
///
/// `draft` and `published` are scoped to the caller's own books, except
/// that an admin listing `published` sees all of them. `finished` and
/// `all` are unscoped.
fn visibility_filter(requested: &str, claims: &Claims) -> Result<BookFilter, AuthError> {
    if requested == "all" {
        return Ok(BookFilter::All);
    }

    let status = BookStatus::from_str(requested)
        .map_err(|_| AuthError::Validation(format!("Unknown book status: {}", requested)))?;

    let filter = match status {
        BookStatus::Draft => BookFilter::ByStatusAndAuthor {
            status,
            author_id: parse_subject(claims)?,
        },
        BookStatus::Published => {
            if claims.role == Role::Admin {
                BookFilter::ByStatus(status)
            } else {
                BookFilter::ByStatusAndAuthor {
                    status,
                    author_id: parse_subject(claims)?,
                }
            }
        }
        BookStatus::Finished => BookFilter::ByStatus(status),
    };

    Ok(filter)
}

/// GET /api/books/status/:status
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(status): Path<String>,
) -> Result<Json<Vec<Book>>, AuthError> {
    let filter = visibility_filter(&status, &claims)?;
    let books = state.books.list(filter).await?;

    Ok(Json(books))
}

/// GET /api/books/:id
///
/// Public: finished books are readable without an account, and the
/// response carries no privileged fields.
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Book>, AuthError> {
    let book = state
        .books
        .find_by_id(book_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    Ok(Json(book))
}

/// POST /api/books
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<Book>), AuthError> {
    authorize(&claims, &[Role::Writer, Role::Admin])?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(AuthError::Validation("Title cannot be empty".to_string()));
    }

    let status = payload.status.unwrap_or(BookStatus::Draft);
    if status == BookStatus::Finished {
        // Finished is only reachable through the admin transition.
        return Err(AuthError::Validation(
            "New books must be draft or published".to_string(),
        ));
    }

    let book = state
        .books
        .insert(NewBook {
            title: title.to_string(),
            author_id: parse_subject(&claims)?,
            genre: payload.genre,
            status,
        })
        .await?;

    tracing::info!(target: "book_handler", status = %book.status, "Book created");

    Ok((StatusCode::CREATED, Json(book)))
}

/// POST /api/books/:id/finish
///
/// The single transition into the terminal state.
pub async fn finish_book(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<Book>, AuthError> {
    authorize(&claims, &[Role::Admin])?;

    let book = state
        .books
        .find_by_id(book_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    if book.status == BookStatus::Finished {
        return Err(AuthError::Conflict("Book is already finished".to_string()));
    }

    let finished = state
        .books
        .set_status(book_id, BookStatus::Finished)
        .await?
        .ok_or(AuthError::NotFound)?;

    tracing::info!(target: "book_handler", "Book finished");

    Ok(Json(finished))
}
