//! Credential validation and password reset endpoints.
//!
//! These are thin JSON fronts over the user directory. No token or
//! session is issued; the caller receives the validated user and the
//! temporary-password flag, as the directory reports them.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use comanda_core::UserRole;

use crate::models::User;
use crate::routes::ApiError;
use crate::routes::users::push_users_in_background;
use crate::services::users::CredentialError;
use crate::state::AppState;

/// Request to validate credentials.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// When present, the user must hold exactly this role.
    #[serde(default)]
    pub required_role: Option<UserRole>,
}

/// Response to a successful validation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub is_temporary_password: bool,
}

/// Validate an email/password pair.
///
/// POST /auth/login
///
/// # Errors
///
/// Returns 401 for an unknown user or wrong password, 403 when the user
/// exists but lacks the required role.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    match state
        .directory()
        .validate_credentials(&req.email, &req.password, req.required_role)
    {
        Ok(validated) => Ok(Json(LoginResponse {
            user: validated.user,
            is_temporary_password: validated.temporary_password,
        })),
        Err(err @ CredentialError::RoleMismatch) => Err(ApiError::forbidden(err.to_string())),
        Err(err) => Err(ApiError::unauthorized(err.to_string())),
    }
}

/// Request to reset a password.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
}

/// Set a new password and clear the temporary flag.
///
/// POST /auth/password
///
/// # Errors
///
/// Returns 404 if the email is unknown.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    if state.directory().reset_password(&req.email, &req.new_password) {
        push_users_in_background(&state);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("user not found"))
    }
}
