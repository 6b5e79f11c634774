//! Application error type and its HTTP representation.
//!
//! Every layer below the HTTP handlers reports failures as [`AppError`].
//! Domain-specific errors ([`AllocationError`], [`CascadeError`]) convert into it
//! so handlers can use `?` throughout.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::application::services::account_service::CascadeError;
use crate::application::services::slug_allocator::AllocationError;
use crate::utils::db_error::is_unique_violation_on_slug;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    Forbidden { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// Random slug generation ran out of attempts. The caller may retry once.
    #[error("{message}")]
    Exhausted { message: String, details: Value },

    /// The first write of an account cascade persisted but the link fan-out did not.
    #[error("{message}")]
    PartialCascade { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::Exhausted {
            message: message.into(),
            details,
        }
    }
    pub fn partial_cascade(message: impl Into<String>, details: Value) -> Self {
        Self::PartialCascade {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            AppError::Exhausted { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "allocation_exhausted")
            }
            AppError::PartialCascade { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "partial_cascade")
            }
            AppError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// HTTP status code this error renders as.
    pub fn status_code(&self) -> StatusCode {
        self.status_and_code().0
    }

    /// Converts the error into its serializable payload.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code) = self.status_and_code();
        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::Unauthorized { message, details }
            | AppError::Forbidden { message, details }
            | AppError::NotFound { message, details }
            | AppError::Conflict { message, details }
            | AppError::Exhausted { message, details }
            | AppError::PartialCascade { message, details }
            | AppError::Internal { message, details } => (message.clone(), details.clone()),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], Json(body)).into_response();
        }

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation_on_slug(&e) {
            return AppError::conflict("Slug already exists", json!({ "constraint": "links_slug_key" }));
        }

        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        tracing::error!(error = %e, "Database error");
        AppError::internal("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request("Validation failed", json!(e))
    }
}

impl From<AllocationError> for AppError {
    fn from(e: AllocationError) -> Self {
        match e {
            AllocationError::InvalidFormat(reason) => AppError::bad_request(
                reason.to_string(),
                json!({ "kind": "invalid_format" }),
            ),
            AllocationError::ReservedSlug(slug) => AppError::bad_request(
                "This slug is reserved and cannot be used",
                json!({ "kind": "reserved_slug", "slug": slug }),
            ),
            AllocationError::SlugTaken(slug) => AppError::conflict(
                "This slug is already taken",
                json!({ "kind": "slug_taken", "slug": slug }),
            ),
            AllocationError::AllocationExhausted { attempts } => AppError::exhausted(
                "Failed to generate unique slug. Please try again.",
                json!({ "kind": "allocation_exhausted", "attempts": attempts }),
            ),
            AllocationError::Store(inner) => inner,
        }
    }
}

impl From<CascadeError> for AppError {
    fn from(e: CascadeError) -> Self {
        match e {
            CascadeError::AccountNotFound(account_id) => AppError::not_found(
                "Account not found",
                json!({ "account_id": account_id }),
            ),
            CascadeError::Store(inner) => inner,
            CascadeError::PartialCascade {
                account_id,
                operation,
                source,
            } => AppError::partial_cascade(
                format!("Account {operation} applied but updating links failed"),
                json!({
                    "account_id": account_id,
                    "operation": operation.to_string(),
                    "reason": source.to_string(),
                }),
            ),
        }
    }
}
