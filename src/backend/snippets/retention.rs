//! Archive retention
//!
//! Snippets left in the archive longer than `archive_retention_days` are
//! removed for good by a periodic task started in `server::init`.

use chrono::{Duration, Utc};

use super::db::purge_archived_before;
use super::handlers::snippet_changed;
use crate::backend::server::state::AppState;
use crate::shared::ChangeAction;

/// Purge expired archive entries; returns how many owners were affected
pub async fn purge_expired_archives(state: &AppState) -> Result<usize, sqlx::Error> {
    let days = state.config.archive_retention_days;
    if days == 0 {
        return Ok(0);
    }

    // a cutoff before the representable range means nothing is old enough
    let Some(cutoff) = Utc::now().checked_sub_signed(Duration::days(i64::from(days))) else {
        tracing::warn!("Archive retention of {} days reaches past the calendar; nothing purged", days);
        return Ok(0);
    };
    let owners = purge_archived_before(&state.db, cutoff).await?;
    for owner_id in &owners {
        snippet_changed(state, *owner_id, ChangeAction::Deleted, serde_json::json!({ "purged": true }));
    }

    if !owners.is_empty() {
        tracing::info!("Archive retention purged snippets of {} users", owners.len());
    }
    Ok(owners.len())
}
