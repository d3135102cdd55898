use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::contact::ContactError;
use common::embed::EmbedError;
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `INVALID_EMBED`,
    /// `INVALID_UPLOAD`, `TOKEN_MISSING`, `TOKEN_INVALID`, `INVALID_CREDENTIALS`,
    /// `PERMISSION_DENIED`, `NOT_FOUND`, `CONFLICT`, `EMAIL_TAKEN`,
    /// `DUPLICATE_SUBMISSION`, `RATE_LIMITED`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Name must be between 2 and 100 characters")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// Embed markup was rejected by the validator or sanitizer.
    InvalidEmbed(String),
    InvalidUpload(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    PermissionDenied,
    NotFound(String),
    Conflict(String),
    EmailTaken,
    /// Same contact message resubmitted inside the window.
    DuplicateSubmission {
        retry_after: u64,
    },
    /// Rate limit exceeded. Contains seconds until retry is allowed.
    RateLimited {
        message: String,
        retry_after: u64,
    },
    Internal(String),
}

impl AppError {
    fn retry_after(&self) -> Option<u64> {
        match self {
            AppError::DuplicateSubmission { retry_after }
            | AppError::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::InvalidEmbed(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "INVALID_EMBED",
                    message: msg,
                },
            ),
            AppError::InvalidUpload(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "INVALID_UPLOAD",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid email or password".into(),
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: "Insufficient permissions".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::EmailTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "EMAIL_TAKEN",
                    message: "Email is already registered".into(),
                },
            ),
            AppError::DuplicateSubmission { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    code: "DUPLICATE_SUBMISSION",
                    message: "Duplicate message detected. Please wait before submitting the same message again.".into(),
                },
            ),
            AppError::RateLimited { message, .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    code: "RATE_LIMITED",
                    message,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg)
            | AppError::InvalidEmbed(msg)
            | AppError::InvalidUpload(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Internal(msg) => f.write_str(msg),
            AppError::RateLimited { message, .. } => f.write_str(message),
            other => write!(f, "{other:?}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retry_after = self.retry_after();
        let (status, body) = self.status_and_body();

        if let Some(seconds) = retry_after {
            (status, [("Retry-After", seconds.to_string())], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<EmbedError> for AppError {
    fn from(err: EmbedError) -> Self {
        AppError::InvalidEmbed(err.to_string())
    }
}

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => AppError::NotFound(format!("File '{name}' not found")),
            StorageError::InvalidName(_) => AppError::NotFound("File not found".into()),
            StorageError::SizeLimitExceeded { limit, .. } => AppError::InvalidUpload(format!(
                "File too large. Maximum size is {}MB.",
                limit / (1024 * 1024)
            )),
            StorageError::Io(e) => AppError::Internal(format!("Storage IO error: {e}")),
        }
    }
}
