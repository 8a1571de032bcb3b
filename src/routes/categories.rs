//! Category routes: CRUD with per-category todo counts.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::category::{Category, CategoryWithCounts, CreateCategory, UpdateCategory};
use crate::services::category as category_service;
use crate::AppState;

/// GET /api/v1/categories — list with todo counts.
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<CategoryWithCounts>>>, AppError> {
    let categories = category_service::list(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(categories))
}

/// POST /api/v1/categories — create a category.
pub async fn create(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateCategory>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), AppError> {
    body.validate()?;
    let category = category_service::create(&state.db, current_user.id, &body).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(category)))
}

/// GET /api/v1/categories/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryWithCounts>>, AppError> {
    let category = category_service::find_by_id(&state.db, current_user.id, id).await?;
    Ok(ApiResponse::success(category))
}

/// PUT /api/v1/categories/:id
pub async fn update(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCategory>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    body.validate()?;
    let category = category_service::update(&state.db, current_user.id, id, &body).await?;
    Ok(ApiResponse::success(category))
}

/// DELETE /api/v1/categories/:id — detaches todos, then deletes.
pub async fn destroy(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    category_service::delete(&state.db, current_user.id, id).await?;
    Ok(ApiResponse::success("Category deleted successfully"))
}
