use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Error taxonomy for the auth service.
///
/// Every variant maps to a client-facing status and stable machine code at
/// the service boundary. Store and hasher internals are carried in
/// `Database`/`Crypto` but their messages are replaced with generic text
/// before reaching the client.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Forbidden: requires one of {required}, caller is {actual}")]
    Forbidden { required: String, actual: String },

    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

impl AuthError {
    /// Status code the variant maps to at the HTTP boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::Conflict(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::ExpiredToken
            | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Database(_) | AuthError::Crypto(_) | AuthError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual_role: Option<String>,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message, required_role, actual_role) = match &self {
            AuthError::Validation(reason) => {
                ("VALIDATION_ERROR", reason.clone(), None, None)
            }
            AuthError::Conflict(reason) => ("CONFLICT", reason.clone(), None, None),
            AuthError::InvalidCredentials => (
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
                None,
                None,
            ),
            // Distinguishable from INVALID_TOKEN so clients can attempt a
            // refresh instead of forcing re-login.
            AuthError::ExpiredToken => (
                "TOKEN_EXPIRED",
                "The token has expired".to_string(),
                None,
                None,
            ),
            // Generic message: no oracle for forgery attempts.
            AuthError::InvalidToken(_) => (
                "INVALID_TOKEN",
                "The token is invalid".to_string(),
                None,
                None,
            ),
            AuthError::Forbidden { required, actual } => (
                "FORBIDDEN",
                format!("Requires role: {}", required),
                Some(required.clone()),
                Some(actual.clone()),
            ),
            AuthError::NotFound => ("NOT_FOUND", "Resource not found".to_string(), None, None),
            AuthError::Database(_) => (
                "DATABASE_ERROR",
                "An internal database error occurred".to_string(),
                None,
                None,
            ),
            AuthError::Crypto(_) => (
                "CRYPTO_ERROR",
                "An internal cryptographic error occurred".to_string(),
                None,
                None,
            ),
            AuthError::Internal => (
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
                None,
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                required_role,
                actual_role,
            },
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Conflict("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::ExpiredToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::InvalidToken("bad".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Forbidden {
                required: "admin".into(),
                actual: "writer".into()
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AuthError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::Database("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_do_not_leak() {
        // The Database variant carries the driver message for logs, but the
        // client-facing body must not contain it.
        let err = AuthError::Database("connection to 10.0.0.5 refused".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
