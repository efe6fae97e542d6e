//! The error type every service and handler returns, and its mapping onto
//! the `{ "success": false, "message", "code" }` envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dashshare_core::error::CoreError;
use dashshare_core::types::DbId;
use serde::Serialize;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed input that never reached a domain rule.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    code: &'static str,
}

impl AppError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        CoreError::NotFound { entity, id }.into()
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        CoreError::Forbidden(message.into()).into()
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into()).into()
    }

    pub fn status(&self) -> StatusCode {
        self.classify().0
    }

    /// The text a client may see. Storage and internal details are replaced
    /// by a generic message.
    pub fn client_message(&self) -> String {
        self.classify().2
    }

    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(CoreError::NotFound { entity, .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", format!("{entity} not found"))
            }
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Core(CoreError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Core(CoreError::Unauthorized(msg)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::Core(CoreError::Forbidden(msg)) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::Core(CoreError::Internal(msg)) | AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();
        let body = ErrorBody {
            success: false,
            message,
            code,
        };
        (status, Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

/// `RowNotFound` is a 404, a Postgres unique violation (23505) a 409, a
/// foreign-key violation (23503) a 400. Anything else is logged and
/// reported as a bare 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if let sqlx::Error::RowNotFound = err {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some("23505") => {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates {constraint}"),
                )
            }
            Some("23503") => {
                return (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("Referenced record does not exist ({constraint})"),
                )
            }
            _ => {}
        }
    }

    tracing::error!(error = %err, "Database error");
    internal()
}
