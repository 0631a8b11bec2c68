//! HTTP handlers for the server.
//!
//! `/print` and `/preview` accept the same inputs and share
//! [`compose_request`]; they differ only in what happens to the image.

pub mod preview;
pub mod print;

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::{JobError, PrintError};
use crate::job::{JobRequest, QueryParams};
use crate::layout::{self, PrintableImage};

use super::state::AppState;

/// Everything a handler can fail with, mapped to a status code.
#[derive(Debug)]
pub enum ApiError {
    Job(JobError),
    Print(PrintError),
    /// Composition or encoding failed inside the server
    Internal(String),
}

impl From<JobError> for ApiError {
    fn from(e: JobError) -> Self {
        ApiError::Job(e)
    }
}

impl From<PrintError> for ApiError {
    fn from(e: PrintError) -> Self {
        ApiError::Print(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Job(e) => {
                let status = match e {
                    JobError::InvalidRequest(_) | JobError::UnsupportedValue(_) => StatusCode::BAD_REQUEST,
                    JobError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
                };
                warn!(status = status.as_u16(), error = %e, "Rejected print request");
                (status, e.to_string())
            }
            // Transport details are already logged by the dispatcher
            ApiError::Print(_) => (StatusCode::BAD_GATEWAY, "Printer unavailable".to_string()),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, format!("{}\n", message)).into_response()
    }
}

/// Normalize a request and compose its image for the dispatcher's printer.
pub async fn compose_request(
    state: &AppState,
    query: QueryParams,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<PrintableImage, ApiError> {
    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let job = state
        .normalizer
        .normalize(JobRequest::select(query, content_type, body))?;

    let capabilities = state.dispatcher.capabilities();
    let composed = tokio::task::spawn_blocking(move || layout::compose(&job, &capabilities)).await;

    match composed {
        Ok(result) => Ok(result?),
        Err(e) => Err(ApiError::Internal(format!("Layout task failed: {}", e))),
    }
}
