//! State read/write endpoints.
//!
//! The read side always answers with a full `{products, users, orders,
//! settings}` body: 200 when the remote store was readable (seeding
//! empty collections along the way), 500 with the all-default body when
//! it was not. The write side reports a uniform success or failure with
//! no per-collection detail.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;
use crate::sync::SavePayload;

/// Body of a successful `POST /data`.
#[derive(Debug, Serialize)]
pub struct SaveStatus {
    status: &'static str,
}

/// Fetch the current state of all collections.
///
/// GET /data
///
/// Runs a refresh load against the remote store. A degraded load (the
/// remote store could not be read) still answers with the seed-default
/// state, but under a 500 so callers know the data is not durable.
pub async fn fetch(State(state): State<AppState>) -> Response {
    let outcome = state.sync().load().await;
    let status = if outcome.degraded {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    (status, Json(outcome.snapshot)).into_response()
}

/// Write any subset of the collections.
///
/// POST /data
///
/// Collections absent from the body are left untouched. On any upsert
/// failure the whole request reports `{"status": "error"}` with no
/// partial-success detail.
///
/// # Errors
///
/// Returns `AppError` if any upsert fails.
pub async fn save(
    State(state): State<AppState>,
    Json(payload): Json<SavePayload>,
) -> Result<Json<SaveStatus>, AppError> {
    state.sync().save(payload).await?;
    Ok(Json(SaveStatus { status: "success" }))
}
