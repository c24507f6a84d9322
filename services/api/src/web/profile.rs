//! services/api/src/web/profile.rs
//!
//! Profile updates for any signed-in user.

use axum::{extract::State, Extension, Json};
use campify_core::generation::FieldErrors;
use campify_core::policy::Route;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorBody};
use crate::web::auth::{validate_password, MessageResponse};
use crate::web::middleware::{require_route, CurrentUser};
use crate::web::state::AppState;
use crate::web::views::UserView;

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserView,
    pub message: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    /// Not checked.
    #[serde(default)]
    pub current_password: Option<String>,
    pub new_password: String,
}

/// Change the display name.
#[utoipa::path(
    put,
    path = "/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 422, description = "Invalid name", body = ErrorBody)
    ),
    tag = "profile"
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    require_route(&user, Route::Profile)?;
    let name = req.name.trim();
    if name.chars().count() < 2 {
        return Err(ApiError::invalid("name", "Name must be at least 2 characters."));
    }

    let updated = state.store.update_user_name(&user.id, name).await?;
    info!("User {} renamed", updated.id);
    Ok(Json(ProfileResponse {
        user: UserView::from(&updated),
        message: "Profile updated successfully.".to_string(),
    }))
}

/// Validate a new password. Passwords are not stored.
#[utoipa::path(
    put,
    path = "/profile/password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password accepted", body = MessageResponse),
        (status = 422, description = "Password too short", body = ErrorBody)
    ),
    tag = "profile"
)]
pub async fn update_password_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_route(&user, Route::Profile)?;
    let mut errors = FieldErrors::new();
    validate_password("newPassword", &req.new_password, &mut errors);
    errors.into_result().map_err(ApiError::Validation)?;

    info!("Password updated for user {}", user.id);
    Ok(Json(MessageResponse {
        message: "Password updated successfully.".to_string(),
    }))
}
