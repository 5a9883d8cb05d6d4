use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::DomainError;

impl DomainError {
    pub fn status(&self) -> StatusCode {
        match self {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            DomainError::Database(_) | DomainError::Storage(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            DomainError::NotFound(msg)
            | DomainError::Validation(msg)
            | DomainError::Unauthorized(msg)
            | DomainError::Forbidden(msg)
            | DomainError::PayloadTooLarge(msg) => msg,
            // Unique-index messages name tables and columns
            DomainError::Conflict(msg) if msg.contains("constraint failed") => {
                tracing::warn!("{}", msg);
                "Resource already exists".to_string()
            }
            DomainError::Conflict(msg) => msg,
            other => {
                tracing::error!("{}", other);
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
