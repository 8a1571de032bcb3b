//! Profile routes: account details, password, settings, deletion.

use axum::{extract::State, Json};
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::user::{ChangePassword, UpdateProfile, UpdateSettings, UserResponse};
use crate::services::profile::{self as profile_service, ProfileOverview};
use crate::AppState;

/// GET /api/v1/profile — profile with todo/category counts.
pub async fn show(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<ProfileOverview>>, AppError> {
    let overview = profile_service::overview(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(overview))
}

/// PUT /api/v1/profile — update name/email/avatar.
pub async fn update(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<UpdateProfile>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    body.validate()?;
    let user = profile_service::update_profile(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::success(user.into()))
}

/// PUT /api/v1/profile/password — change password.
pub async fn update_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<ChangePassword>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    body.validate()?;
    profile_service::change_password(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::success("Password changed successfully"))
}

/// PUT /api/v1/profile/settings — notification/timezone/theme/font preferences.
pub async fn update_settings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<UpdateSettings>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    body.validate()?;
    let user = profile_service::update_settings(&state.db, current_user.id, &body).await?;
    Ok(ApiResponse::success(user.into()))
}

/// DELETE /api/v1/profile — delete account and all owned data.
pub async fn destroy(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    profile_service::delete_account(&state.db, current_user.id).await?;
    Ok(ApiResponse::success("Account deleted successfully"))
}
