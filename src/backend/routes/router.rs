/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Groups
 *
 * 1. `/health` - liveness and version
 * 2. `/api/auth/signup`, `/api/auth/login` - behind the auth rate limiter
 * 3. `/api/v1/...` - API-key routes behind the API rate limiter
 * 4. Session API, groups and admin routes
 * 5. Fallback handler (JSON 404)
 *
 * Every request is traced by `tower_http::trace::TraceLayer`.
 */

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::backend::auth::handlers::{login, signup};
use crate::backend::error::BackendError;
use crate::backend::external;
use crate::backend::rate_limit::{api_rate_limit, auth_rate_limit};
use crate::backend::routes::api_routes::{configure_admin_routes, configure_api_routes, configure_group_routes};
use crate::backend::server::database::Database;
use crate::backend::server::state::AppState;

/// Body of `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness probe; reports `degraded` with 503 when the store is unreachable
pub async fn health(State(pool): State<SqlitePool>) -> impl IntoResponse {
    let healthy = Database::ping(&pool).await;
    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

async fn not_found() -> BackendError {
    BackendError::not_found("Route not found")
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let auth_routes = Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route_layer(middleware::from_fn_with_state(
            app_state.limiters.clone(),
            auth_rate_limit,
        ));

    let external_routes = Router::new()
        .route(
            "/api/v1/snippets",
            get(external::list_snippets).post(external::create_snippet),
        )
        .route("/api/v1/snippets/{id}", get(external::get_snippet))
        .route_layer(middleware::from_fn_with_state(
            app_state.limiters.clone(),
            api_rate_limit,
        ));

    let router = Router::new()
        .route("/health", get(health))
        .merge(auth_routes)
        .merge(external_routes);

    let router = configure_api_routes(router);
    let router = configure_group_routes(router);
    let router = configure_admin_routes(router);

    router
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
