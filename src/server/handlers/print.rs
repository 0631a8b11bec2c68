//! Print handler.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
};
use std::sync::Arc;

use crate::job::QueryParams;

use super::super::state::AppState;
use super::{ApiError, compose_request};

/// Handle GET|POST /print - compose the job and print it.
///
/// Responds once the printer has accepted the job.
pub async fn print(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QueryParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let image = compose_request(&state, query, &headers, &body).await?;
    state.dispatcher.print(image).await?;
    Ok("OK\n")
}
