use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use depot_core::error::CoreError;
use depot_workflow::ApprovalError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for request-level failures and [`ApprovalError`] for
/// workflow rejections. Implements [`IntoResponse`] to produce consistent
/// JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A request-level error (auth, validation, lookups).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A rejection or failure from the approval workflow.
    #[error(transparent)]
    Approval(#[from] ApprovalError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Approval(err) => classify_approval_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
    }
}

/// Map workflow errors onto HTTP. Business rejections keep their message;
/// storage failures are logged and sanitized.
fn classify_approval_error(err: &ApprovalError) -> (StatusCode, &'static str, String) {
    match err {
        ApprovalError::AlreadyPending(_) => {
            (StatusCode::CONFLICT, "ALREADY_PENDING", err.to_string())
        }
        ApprovalError::NoPendingApproval(_) => {
            (StatusCode::CONFLICT, "NO_PENDING_APPROVAL", err.to_string())
        }
        ApprovalError::InvalidState { .. } => {
            (StatusCode::CONFLICT, "INVALID_STATE", err.to_string())
        }
        ApprovalError::InsufficientStock { .. } => {
            (StatusCode::CONFLICT, "INSUFFICIENT_STOCK", err.to_string())
        }
        ApprovalError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        ApprovalError::Unauthenticated => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
        }
        ApprovalError::InvalidDocument(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        ApprovalError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        ApprovalError::Storage(store) => {
            tracing::error!(error = %store, "Approval storage error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}
