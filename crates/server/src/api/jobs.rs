use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use archivist_core::{Invocation, JobError, JobEvent};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub stage: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, stage: Option<&str>) -> Self {
        Self {
            error: error.into(),
            stage: stage.map(str::to_string),
        }
    }
}

/// Status code a failed job is reported with.
pub fn status_for(error: &JobError) -> StatusCode {
    match error {
        JobError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
        JobError::MalformedAddress(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Runs one job per request, each as its own invocation.
pub async fn submit_job(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let event: JobEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("Rejected malformed job event: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("Malformed job event: {}", e), None)),
            )
                .into_response();
        }
    };

    let invocation = Invocation::ephemeral(uuid::Uuid::new_v4().to_string());
    info!(
        invocation_id = invocation.id.as_deref().unwrap_or_default(),
        "Accepted job"
    );

    match state.processor().handle(event, &invocation).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            let status = status_for(&e);
            let body = match &e {
                // Do not tell callers why their token was rejected
                JobError::AuthenticationFailed(_) => {
                    ErrorResponse::new("Authentication failed", Some(e.stage().as_str()))
                }
                _ => ErrorResponse::new(e.to_string(), Some(e.stage().as_str())),
            };
            (status, Json(body)).into_response()
        }
    }
}
