use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum OrganizationsError {
    #[error("{0}")]
    InvalidBatchShape(String),
    #[error("{0}")]
    Validation(String),
    #[error("Not found.")]
    NotFound,
    #[error("employee with this emp_no already exists: {0}")]
    Conflict(String),
    #[error("No active account found with the given credentials")]
    InvalidCredentials,
    #[error("Token is invalid or expired")]
    InvalidToken,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrganizationsError {
    /// Body that is not JSON, or JSON that does not fit the expected shape.
    pub fn invalid_body(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for OrganizationsError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            Self::InvalidBatchShape(msg) | Self::Validation(msg) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
            }
            Self::Conflict(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": self.to_string() }),
            ),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "detail": self.to_string() }),
            ),
            Self::InvalidCredentials | Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "detail": self.to_string() }),
            ),
            Self::Store(e) => {
                error!("Organizations store failure: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal server error" }),
                )
            }
            Self::Internal(msg) => {
                error!("Organizations internal failure: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
