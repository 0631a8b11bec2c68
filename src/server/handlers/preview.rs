//! Preview handler.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::job::QueryParams;

use super::super::state::AppState;
use super::{ApiError, compose_request};

/// Handle GET|POST /preview - render the job as PNG without printing.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let image = compose_request(&state, query, &headers, &body).await?;
    let png_bytes = image
        .to_png()
        .map_err(|e| ApiError::Internal(format!("Preview render failed: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png_bytes))
}
