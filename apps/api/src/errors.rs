use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::gateway::GatewayError;

/// Per-field validation messages, keyed by request field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Invalid API token")]
    InvalidCredential,

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("{message}: {detail}")]
    OperationFailed { message: String, detail: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Single-field validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        AppError::Validation(errors)
    }

    /// Catch-all failure of a named operation, keeping the underlying message.
    pub fn operation(message: &str, cause: impl std::fmt::Display) -> Self {
        AppError::OperationFailed {
            message: message.to_string(),
            detail: cause.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidCredential | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Gateway(_)
            | AppError::OperationFailed { .. }
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut extra = Map::new();

        let (code, message) = match self {
            AppError::NotFound(msg) => ("NOT_FOUND", msg),
            AppError::Validation(errors) => {
                extra.insert("errors".into(), json!(errors));
                ("VALIDATION_ERROR", "The given data was invalid".to_string())
            }
            AppError::InvalidCredential => (
                "INVALID_CREDENTIAL",
                "Invalid API token. Please provide a valid token.".to_string(),
            ),
            AppError::Unauthorized => ("UNAUTHORIZED", "Unauthorized".to_string()),
            AppError::Gateway(e) => {
                tracing::error!("AI gateway error: {e}");
                extra.insert("gemini_response".into(), e.upstream().clone());
                ("GATEWAY_ERROR", e.to_string())
            }
            AppError::OperationFailed { message, detail } => {
                tracing::error!("{message}: {detail}");
                extra.insert("error".into(), Value::String(detail));
                ("OPERATION_FAILED", message)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                ("DATABASE_ERROR", "A database error occurred".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(false));
        body.insert("code".into(), Value::String(code.to_string()));
        body.insert("message".into(), Value::String(message));
        body.extend(extra);

        (status, Json(Value::Object(body))).into_response()
    }
}
