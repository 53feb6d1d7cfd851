//! User management endpoints.
//!
//! Mutations apply to the shared container immediately and push the
//! user collection to the remote store in the background; a failed push
//! is logged for reconciliation instead of failing the request.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::warn;

use comanda_core::UserId;

use crate::models::User;
use crate::routes::ApiError;
use crate::services::users::{NewUser, UserError, UserPatch};
use crate::state::AppState;

/// Response to a successful user creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub user: User,
    /// One-time plaintext of the generated temporary password, when the
    /// role policy produced one. Deliver it out of band; it is never
    /// returned again.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_password: Option<String>,
}

/// Create a user.
///
/// POST /users
///
/// # Errors
///
/// Returns 409 if the email is already taken (compared case-insensitively).
pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<NewUser>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let created = state.directory().add_user(data).map_err(|err| match err {
        UserError::EmailTaken(_) => ApiError::conflict(err.to_string()),
    })?;

    push_users_in_background(&state);

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            user: created.user,
            temp_password: created.temp_password,
        }),
    ))
}

/// Update a user.
///
/// PATCH /users/{id}
///
/// The patch cannot touch id, password, or the temporary-password flag;
/// a waiter's cedula change re-syncs their password as a side effect.
///
/// # Errors
///
/// Returns 404 if no user has the id.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<UserPatch>,
) -> Result<StatusCode, ApiError> {
    if state.directory().update_user(UserId::new(id), patch) {
        push_users_in_background(&state);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("user not found"))
    }
}

/// Delete a user.
///
/// DELETE /users/{id}
///
/// # Errors
///
/// Returns 404 if no user has the id.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.directory().delete_user(UserId::new(id)) {
        push_users_in_background(&state);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("user not found"))
    }
}

/// Fire-and-forget push of the mutated user collection.
pub(crate) fn push_users_in_background(state: &AppState) {
    let sync = state.sync().clone();
    tokio::spawn(async move {
        if let Err(err) = sync.push_users().await {
            warn!(error = %err, "background user sync failed; remote store needs reconciliation");
        }
    });
}
