//! Route definitions and router assembly for the Taskforge API.

pub mod auth;
pub mod categories;
pub mod health;
pub mod profile;
pub mod stats;
pub mod todos;

use axum::http::HeaderValue;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Maximum accepted request body size (1 MiB).
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the full application router. Shared by `main` and the end-to-end
/// tests so both serve an identical API surface.
pub fn api_router(state: AppState) -> Router {
    let allow_origin = state
        .config
        .frontend_url
        .parse::<HeaderValue>()
        .map(AllowOrigin::exact)
        .unwrap_or_else(|_| AllowOrigin::any());
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let profile_routes = Router::new()
        .route(
            "/profile",
            get(profile::show)
                .put(profile::update)
                .delete(profile::destroy),
        )
        .route("/profile/password", put(profile::update_password))
        .route("/profile/settings", put(profile::update_settings));

    let todo_routes = Router::new()
        .route("/todos", get(todos::list).post(todos::create))
        .route("/todos/trash", get(todos::trash))
        .route("/todos/export", get(todos::export))
        .route(
            "/todos/{id}",
            get(todos::get_by_id)
                .put(todos::update)
                .delete(todos::destroy),
        )
        .route("/todos/{id}/force", delete(todos::force_destroy))
        .route("/todos/{id}/restore", patch(todos::restore))
        .route("/todos/{id}/complete", patch(todos::complete))
        .route("/todos/{id}/uncomplete", patch(todos::uncomplete));

    let category_routes = Router::new()
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::get_by_id)
                .put(categories::update)
                .delete(categories::destroy),
        );

    let stats_routes = Router::new()
        .route("/stats", get(stats::index))
        .route("/stats/summary", get(stats::summary))
        .route("/stats/priority-breakdown", get(stats::priority_breakdown))
        .route("/stats/category-breakdown", get(stats::category_breakdown))
        .route("/stats/activity-timeline", get(stats::activity_timeline))
        .route("/stats/overdue-analysis", get(stats::overdue_analysis));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", auth_routes)
        .nest("/api/v1", profile_routes)
        .nest("/api/v1", todo_routes)
        .nest("/api/v1", category_routes)
        .nest("/api/v1", stats_routes)
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
