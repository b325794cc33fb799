use crate::models::LimitKind;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A quota-consuming action was attempted at or above the effective limit.
    #[error("{message}")]
    LimitExceeded {
        kind: LimitKind,
        limit: i64,
        message: String,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    pub fn limit_exceeded(kind: LimitKind, limit: i64) -> Self {
        AppError::LimitExceeded {
            kind,
            limit,
            message: format!(
                "{} limit reached ({limit}). Upgrade your plan or purchase {} to continue.",
                kind.label(),
                kind.remediation()
            ),
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::LimitExceeded { message, .. } => {
                (StatusCode::FORBIDDEN, "LIMIT_EXCEEDED", message.clone())
            }
            AppError::InvalidState(msg) => (StatusCode::CONFLICT, "INVALID_STATE", msg.clone()),
            AppError::PaymentDeclined(msg) => {
                (StatusCode::PAYMENT_REQUIRED, "PAYMENT_DECLINED", msg.clone())
            }
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Database error".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.parts().0
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::LimitExceeded { kind, limit, .. } => {
                log::info!("Limit exceeded: kind={kind} limit={limit}")
            }
            AppError::ValidationError(msg) => log::warn!("Validation error: {msg}"),
            AppError::InvalidState(msg) => log::warn!("Invalid state: {msg}"),
            AppError::PaymentDeclined(msg) => log::warn!("Payment declined: {msg}"),
            AppError::NotFound(_) => {}
            AppError::DatabaseError(err) => log::error!("Database error: {err}"),
            _ => log::error!("Internal error: {self}"),
        }

        let (status_code, error_code, message) = self.parts();
        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
