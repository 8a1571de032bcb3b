//! Todo routes: CRUD, filtered listing, soft-delete lifecycle, and export.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::pagination::{Paged, Pagination};
use crate::models::todo::{CreateTodo, TodoFilters, TodoWithCategory, UpdateTodo};
use crate::services::todo as todo_service;
use crate::AppState;

/// GET /api/v1/todos — list active todos with filters and pagination.
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<TodoFilters>,
) -> Result<Json<ApiResponse<Paged<TodoWithCategory>>>, AppError> {
    let result =
        todo_service::list(&state.db, current_user.id, &filters, &pagination, Utc::now()).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/todos — create a todo.
pub async fn create(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateTodo>,
) -> Result<(StatusCode, Json<ApiResponse<TodoWithCategory>>), AppError> {
    body.validate()?;
    let todo = todo_service::create(&state.db, current_user.id, &body, Utc::now()).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(todo)))
}

/// GET /api/v1/todos/trash — list soft-deleted todos.
pub async fn trash(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<Paged<TodoWithCategory>>>, AppError> {
    let result = todo_service::list_trashed(&state.db, current_user.id, &pagination).await?;
    Ok(ApiResponse::success(result))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// JSON export payload.
#[derive(Debug, Serialize)]
pub struct ExportPayload {
    pub todos: Vec<TodoWithCategory>,
    pub exported_at: DateTime<Utc>,
    pub total: usize,
}

/// GET /api/v1/todos/export?format=json|csv — export all active todos.
pub async fn export(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let todos = todo_service::export_all(&state.db, current_user.id).await?;
    let now = Utc::now();

    match query.format.as_deref() {
        Some("csv") => {
            let body = todo_service::write_csv(&todos)?;
            let disposition = format!(
                "attachment; filename=\"todos-{}.csv\"",
                now.format("%Y-%m-%d")
            );
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response())
        }
        Some("json") | None => {
            let total = todos.len();
            Ok(ApiResponse::success(ExportPayload {
                todos,
                exported_at: now,
                total,
            })
            .into_response())
        }
        Some(other) => Err(AppError::Validation(format!(
            "Unsupported export format '{other}'"
        ))),
    }
}

/// GET /api/v1/todos/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TodoWithCategory>>, AppError> {
    let todo = todo_service::find_by_id(&state.db, current_user.id, id).await?;
    Ok(ApiResponse::success(todo))
}

/// PUT /api/v1/todos/:id — partial update.
pub async fn update(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTodo>,
) -> Result<Json<ApiResponse<TodoWithCategory>>, AppError> {
    body.validate()?;
    let todo = todo_service::update(&state.db, current_user.id, id, &body, Utc::now()).await?;
    Ok(ApiResponse::success(todo))
}

/// DELETE /api/v1/todos/:id — move to trash.
pub async fn destroy(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    todo_service::soft_delete(&state.db, current_user.id, id, Utc::now()).await?;
    Ok(ApiResponse::success("Todo moved to trash"))
}

/// DELETE /api/v1/todos/:id/force — permanently delete.
pub async fn force_destroy(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    todo_service::force_delete(&state.db, current_user.id, id).await?;
    Ok(ApiResponse::success("Todo permanently deleted"))
}

/// PATCH /api/v1/todos/:id/restore — restore from trash.
pub async fn restore(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TodoWithCategory>>, AppError> {
    let todo = todo_service::restore(&state.db, current_user.id, id, Utc::now()).await?;
    Ok(ApiResponse::success(todo))
}

/// PATCH /api/v1/todos/:id/complete
pub async fn complete(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TodoWithCategory>>, AppError> {
    let todo = todo_service::complete(&state.db, current_user.id, id, Utc::now()).await?;
    Ok(ApiResponse::success(todo))
}

/// PATCH /api/v1/todos/:id/uncomplete
pub async fn uncomplete(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TodoWithCategory>>, AppError> {
    let todo = todo_service::uncomplete(&state.db, current_user.id, id, Utc::now()).await?;
    Ok(ApiResponse::success(todo))
}
