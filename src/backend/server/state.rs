/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The validated server configuration
 * - The SQLite connection pool
 * - The query cache and the rate limiters
 * - The per-user realtime hub
 * - The audit event logger
 *
 * Every field is cheap to clone (`Arc` or a pool handle), so handlers can
 * extract just the part they need.
 *
 * # Example
 *
 * ```rust,ignore
 * use axum::extract::State;
 * use sqlx::SqlitePool;
 *
 * async fn handler(State(pool): State<SqlitePool>) {
 *     // query the store
 * }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::audit::EventLogger;
use crate::backend::cache::QueryCache;
use crate::backend::rate_limit::RateLimiters;
use crate::backend::realtime::RealtimeHub;
use crate::backend::server::config::ServerConfig;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub cache: QueryCache,
    pub realtime: RealtimeHub,
    pub limiters: RateLimiters,
    pub audit: EventLogger,
}

impl AppState {
    pub fn new(config: ServerConfig, db: SqlitePool) -> Self {
        Self {
            cache: QueryCache::new(config.cache_ttl),
            realtime: RealtimeHub::new(),
            limiters: RateLimiters::new(
                config.auth_rate_limit,
                config.rate_limit,
                config.trust_proxy_headers,
            ),
            audit: EventLogger::new(db.clone()),
            config: Arc::new(config),
            db,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for QueryCache {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.cache.clone()
    }
}

impl FromRef<AppState> for RealtimeHub {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.realtime.clone()
    }
}

impl FromRef<AppState> for RateLimiters {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.limiters.clone()
    }
}

impl FromRef<AppState> for EventLogger {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.audit.clone()
    }
}
