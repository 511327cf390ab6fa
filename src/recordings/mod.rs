//! Latest assessment status per employee number.
//!
//! The status of a recording comes from the enrollment of the recording's
//! employee in the course whose title equals the recording's motion name.
//! No matching enrollment means `status = false`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::store::{RecordStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum RecordingsError {
    #[error("No recording found for this user.")]
    NoRecordingFound,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for RecordingsError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::NoRecordingFound => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "detail": self.to_string() })),
            )
                .into_response(),
            Self::Store(e) => {
                error!("Recording status lookup failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    pub user: String,
    pub motion_type: String,
    pub score: f64,
    pub recorded_at: DateTime<Utc>,
    pub status: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub view: StatusView,
}

pub struct StatusResolver {
    store: Arc<dyn RecordStore>,
}

impl StatusResolver {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, emp_no: &str) -> Result<StatusView, RecordingsError> {
        let recording = self
            .store
            .latest_recording(emp_no)
            .await?
            .ok_or(RecordingsError::NoRecordingFound)?;

        let status = self
            .store
            .enrollment_status(recording.employee_id, &recording.motion_name)
            .await?
            .unwrap_or_else(|| {
                debug!(
                    "No enrollment in '{}' for employee {emp_no}, defaulting to false",
                    recording.motion_name
                );
                false
            });

        Ok(StatusView {
            user: recording.employee_name,
            motion_type: recording.motion_name,
            score: recording.score,
            recorded_at: recording.recorded_at,
            status,
        })
    }
}

pub async fn handle_user_recording(
    State(state): State<Arc<AppState>>,
    Path(emp_no): Path<String>,
) -> Result<Json<StatusResponse>, RecordingsError> {
    let view = StatusResolver::new(state.store.clone())
        .resolve(&emp_no)
        .await?;
    Ok(Json(StatusResponse { ok: true, view }))
}

pub fn configure_recording_routes() -> Router<Arc<AppState>> {
    Router::new().route(ApiUrls::USER_RECORDING, get(handle_user_recording))
}
