//! # Web Error Type
//!
//! Unified error type for route handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockroom                              │
//! │                                                                         │
//! │  Handler: Result<T, WebError>                                          │
//! │         │                                                               │
//! │         ├── ValidationError ─────────────► INVALID_ARGUMENT     400    │
//! │         ├── CoreError::InsufficientStock ─► INSUFFICIENT_STOCK  409    │
//! │         ├── DbError::NotFound ────────────► NOT_FOUND           404    │
//! │         ├── DbError::UniqueViolation ─────► ALREADY_EXISTS      409    │
//! │         ├── DbError (pool/io/locked) ─────► STORAGE_UNAVAILABLE 503    │
//! │         └── anything else ────────────────► INTERNAL            500    │
//! │                                                                         │
//! │  HTML routes: WebError  → error page with the message                  │
//! │  JSON API:    ApiError  → {"code": "NOT_FOUND", "message": "..."}      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal details are logged here and replaced with a generic message.

use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;
use ts_rs::TS;

use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;

use crate::views;

/// Error returned from route handlers.
///
/// ## Serialization
/// The JSON API sends exactly this shape:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 5449000000996"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct WebError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes and their HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad form or path input (400)
    InvalidArgument,

    /// Resource not found (404)
    NotFound,

    /// Unique key already taken (409)
    AlreadyExists,

    /// Sale would take stock below zero (409)
    InsufficientStock,

    /// Database unreachable, closed or locked (503)
    StorageUnavailable,

    /// No valid session, or bad credentials (303 to /login)
    Unauthenticated,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl WebError {
    /// Creates a new web error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        WebError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        WebError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates an invalid argument error.
    pub fn invalid(message: impl Into<String>) -> Self {
        WebError::new(ErrorCode::InvalidArgument, message)
    }

    /// Creates an internal error. The detail is logged, not returned.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        WebError::new(ErrorCode::Internal, "Something went wrong")
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for WebError {}

/// Converts database errors to web errors.
impl From<DbError> for WebError {
    fn from(err: DbError) -> Self {
        if err.is_unavailable() {
            tracing::error!(error = %err, "Storage unavailable");
            return WebError::new(
                ErrorCode::StorageUnavailable,
                "Storage is temporarily unavailable, please retry",
            );
        }

        match err {
            DbError::NotFound { entity, id } => WebError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => WebError::new(
                ErrorCode::AlreadyExists,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Domain(e) => WebError::from(e),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                WebError::invalid("Invalid reference")
            }
            other => WebError::internal(other),
        }
    }
}

/// Converts core errors to web errors.
impl From<CoreError> for WebError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => WebError::not_found("Product", &id),
            e @ CoreError::InsufficientStock { .. } => {
                WebError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            e @ CoreError::InvalidCredentials => {
                WebError::new(ErrorCode::Unauthenticated, e.to_string())
            }
            CoreError::Validation(e) => WebError::from(e),
        }
    }
}

impl From<ValidationError> for WebError {
    fn from(err: ValidationError) -> Self {
        WebError::invalid(err.to_string())
    }
}

/// HTML routes: an error page, or a redirect to the login form when the
/// visitor is not signed in.
impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.code == ErrorCode::Unauthenticated {
            return Redirect::to("/login").into_response();
        }

        let status = self.status();
        (
            status,
            [(header::CACHE_CONTROL, "no-store")],
            Html(views::error_page(status, &self.message)),
        )
            .into_response()
    }
}

/// The JSON flavour of [`WebError`], for `/api` routes.
#[derive(Debug)]
pub struct ApiError(pub WebError);

impl<E> From<E> for ApiError
where
    E: Into<WebError>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0.status(), Json(self.0)).into_response()
    }
}

/// Result type for HTML handlers.
pub type WebResult<T> = Result<T, WebError>;

/// Result type for JSON handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::InvalidArgument.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::AlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::InsufficientStock.status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::StorageUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ErrorCode::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_db_error_mapping() {
        let e = WebError::from(DbError::duplicate("barcode", "123"));
        assert_eq!(e.code, ErrorCode::AlreadyExists);

        let e = WebError::from(DbError::not_found("Product", "p-1"));
        assert_eq!(e.code, ErrorCode::NotFound);

        let e = WebError::from(DbError::PoolExhausted);
        assert_eq!(e.code, ErrorCode::StorageUnavailable);

        let e = WebError::from(DbError::QueryFailed("syntax error near SELEC".to_string()));
        assert_eq!(e.code, ErrorCode::Internal);
        assert!(!e.message.contains("SELEC"));
    }

    #[test]
    fn test_core_error_mapping() {
        let e = WebError::from(DbError::Domain(CoreError::InsufficientStock {
            product: "Cola".to_string(),
            available: 2,
            requested: 5,
        }));
        assert_eq!(e.code, ErrorCode::InsufficientStock);
        assert!(e.message.contains("available 2"));

        let e = WebError::from(CoreError::Validation(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }));
        assert_eq!(e.code, ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(WebError::not_found("Product", "42")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: 42");
    }

    #[test]
    fn test_unauthenticated_redirects() {
        let response = WebError::from(CoreError::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }
}
