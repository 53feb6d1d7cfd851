//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers return `Result<T, AppError>`
//! for failures that are system faults rather than business outcomes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Remote store operation failed.
    #[error("remote store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Store failures are system faults; capture them.
        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(StoreError::Read { .. }) => "Failed to read data",
            Self::Store(StoreError::Write { .. }) => "Failed to write data",
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "error", "message": message})),
        )
            .into_response()
    }
}
