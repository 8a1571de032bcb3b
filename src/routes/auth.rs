//! Authentication routes: register, login, refresh, logout, current user.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::user::{RegisterUser, UserResponse};
use crate::services::auth as auth_service;
use crate::services::auth::TokenPair;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// User plus token pair returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterUser>,
) -> Result<(StatusCode, Json<ApiResponse<AuthPayload>>), AppError> {
    body.validate()?;

    let user = auth_service::register(&state.db, &body).await?;
    let tokens = auth_service::generate_tokens(
        &user,
        &state.config.jwt_secret,
        state.config.jwt_access_token_expiry_secs,
        state.config.jwt_refresh_token_expiry_secs,
    )?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(AuthPayload {
            user: user.into(),
            tokens,
        }),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>, AppError> {
    let user = auth_service::login(&state.db, &body.email, &body.password).await?;
    let tokens = auth_service::generate_tokens(
        &user,
        &state.config.jwt_secret,
        state.config.jwt_access_token_expiry_secs,
        state.config.jwt_refresh_token_expiry_secs,
    )?;

    Ok(ApiResponse::success(AuthPayload {
        user: user.into(),
        tokens,
    }))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let tokens = auth_service::refresh_token(
        &state.db,
        &body.refresh_token,
        &state.config.jwt_secret,
        state.config.jwt_access_token_expiry_secs,
        state.config.jwt_refresh_token_expiry_secs,
    )
    .await?;

    Ok(ApiResponse::success(tokens))
}

/// POST /api/v1/auth/logout — client-side token discard (stateless JWT)
pub async fn logout(_user: CurrentUser) -> Json<ApiResponse<&'static str>> {
    ApiResponse::success("Logged out successfully")
}

/// GET /api/v1/auth/me — current user profile
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = auth_service::find_user_by_id(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}
