// HealthStack error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum StackError {
    #[error("healthstack not found")]
    NotFound,

    #[error("healthstack already has a worker")]
    AlreadyHasWorker,

    #[error("validation error")]
    Validation(#[from] validator::ValidationErrors),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for StackError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            StackError::NotFound => (StatusCode::NOT_FOUND, "HealthStack not found".to_string()),
            StackError::AlreadyHasWorker => (
                StatusCode::NOT_FOUND,
                "HealthStack already has a worker".to_string(),
            ),
            StackError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "Request validation failed".to_string(),
            ),
            StackError::Database(e) => {
                error!("Database error in healthstack: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
