use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use capstone_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `capstone_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, error code, message and optional support reference of a failure.
type Classified = (StatusCode, &'static str, String, Option<String>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, reference) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "ok": false,
            "message": message,
            "code": code,
        });
        if let Some(reference) = reference {
            body["reference"] = json!(reference);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> Classified {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
            None,
        ),
        CoreError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            msg.clone(),
            None,
        ),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
        CoreError::CapacityExceeded(msg) => (
            StatusCode::CONFLICT,
            "CAPACITY_EXCEEDED",
            msg.clone(),
            None,
        ),
        CoreError::NoEligibleTargets(msg) => (
            StatusCode::CONFLICT,
            "NO_ELIGIBLE_TARGETS",
            msg.clone(),
            None,
        ),
        CoreError::TimeWindowExceeded(msg) => (
            StatusCode::FORBIDDEN,
            "TIME_WINDOW_EXCEEDED",
            msg.clone(),
            None,
        ),
        CoreError::Unauthorized(msg) => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
        }
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a correlation reference that is logged
///   alongside the full error; the body carries no database detail.
fn classify_sqlx_error(err: &sqlx::Error) -> Classified {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
            None,
        ),
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            // PostgreSQL unique constraint violation: error code 23505
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                    None,
                );
            }
            persistence_failure(err)
        }
        other => persistence_failure(other),
    }
}

fn persistence_failure(err: &sqlx::Error) -> Classified {
    let reference = uuid::Uuid::new_v4().to_string();
    tracing::error!(error = %err, reference = %reference, "Persistence error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "PERSISTENCE_ERROR",
        "A storage error occurred; quote the reference when reporting it".to_string(),
        Some(reference),
    )
}
