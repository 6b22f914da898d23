/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including state creation, database start-up, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Connect to SQLite and apply migrations
 * 2. Build the shared `AppState` (cache, limiters, realtime hub, audit log)
 * 3. Start periodic maintenance tasks
 * 4. Create and configure the router
 */

use std::time::Duration;

use axum::Router;
use tokio::task::JoinHandle;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::database::Database;
use crate::backend::server::state::AppState;
use crate::backend::snippets::retention::purge_expired_archives;

const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(60);
const RETENTION_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Connect the store and assemble the application state
pub async fn build_state(config: ServerConfig) -> Result<AppState, sqlx::Error> {
    let database = Database::connect(&config.database_url).await?;
    Ok(AppState::new(config, database.into_pool()))
}

/// Create and configure the Axum application
///
/// Background tasks are started on the current runtime and live as long as
/// the process.
pub async fn create_app(config: ServerConfig) -> Result<Router<()>, sqlx::Error> {
    tracing::info!("Initializing CodePocket backend server");

    let state = build_state(config).await?;
    spawn_housekeeping(state.clone());
    spawn_archive_retention(state.clone());

    let app = create_router(state);
    tracing::info!("Router configured with periodic maintenance tasks");
    Ok(app)
}

/// Expire cache entries, forget idle rate-limit windows and drop realtime
/// channels nobody listens to
pub fn spawn_housekeeping(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(HOUSEKEEPING_INTERVAL);
        loop {
            interval.tick().await;
            let expired = state.cache.purge_expired();
            state.limiters.prune();
            let channels = state.realtime.cleanup_inactive_channels();
            tracing::debug!(
                "Housekeeping: {} cache entries expired, {} realtime channels dropped",
                expired,
                channels
            );
        }
    })
}

pub fn spawn_archive_retention(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RETENTION_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = purge_expired_archives(&state).await {
                tracing::error!("Archive retention failed: {:?}", e);
            }
        }
    })
}
