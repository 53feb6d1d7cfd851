//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health          - Health check
//!
//! # State synchronization
//! GET  /data            - Full state (refreshes from the remote store)
//! POST /data            - Partial-state write (any subset of collections)
//!
//! # Users
//! POST   /users         - Create user (role-based password policy)
//! PATCH  /users/{id}    - Update user (credentials excluded)
//! DELETE /users/{id}    - Delete user
//!
//! # Auth
//! POST /auth/login      - Validate credentials
//! POST /auth/password   - Reset password
//! ```

pub mod auth;
pub mod data;
pub mod users;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::Serialize;

use crate::state::AppState;

/// Error response for JSON API endpoints.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    pub error: String,
}

impl ApiError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            error: msg.into(),
        }
    }

    pub(crate) fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    pub(crate) fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, msg)
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub(crate) fn conflict(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create))
        .route("/{id}", patch(users::update).delete(users::remove))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/password", post(auth::reset_password))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        // State synchronization
        .route("/data", get(data::fetch).post(data::save))
        // User management
        .nest("/users", user_routes())
        // Auth
        .nest("/auth", auth_routes())
}
