//! Statistics routes: dashboard aggregations for the current user.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::services::stats::{
    self as stats_service, CategoryBreakdown, DashboardStats, OverdueAnalysis, PriorityBreakdown,
    Summary, TimelineDay, DEFAULT_TIMELINE_DAYS,
};
use crate::AppState;

/// GET /api/v1/stats — all dashboard sections in one payload.
pub async fn index(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let stats = stats_service::dashboard(&state.db, current_user.id, Utc::now()).await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/v1/stats/summary
pub async fn summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<Summary>>, AppError> {
    let summary = stats_service::summary(&state.db, current_user.id, Utc::now()).await?;
    Ok(ApiResponse::success(summary))
}

/// GET /api/v1/stats/priority-breakdown
pub async fn priority_breakdown(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<PriorityBreakdown>>, AppError> {
    let breakdown = stats_service::priority_breakdown(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(breakdown))
}

/// GET /api/v1/stats/category-breakdown
pub async fn category_breakdown(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<CategoryBreakdown>>, AppError> {
    let breakdown = stats_service::category_breakdown(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(breakdown))
}

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    pub days: Option<i64>,
}

/// GET /api/v1/stats/activity-timeline?days=N
pub async fn activity_timeline(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<ApiResponse<Vec<TimelineDay>>>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_TIMELINE_DAYS);
    let timeline =
        stats_service::activity_timeline(&state.db, current_user.id, Utc::now(), days).await?;
    Ok(ApiResponse::success(timeline))
}

/// GET /api/v1/stats/overdue-analysis
pub async fn overdue_analysis(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<OverdueAnalysis>>, AppError> {
    let analysis = stats_service::overdue_analysis(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(analysis))
}
