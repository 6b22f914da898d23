//! `GET /api/groups/{id}/activity?limit&before&before_id`

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use uuid::Uuid;

use super::require_member;
use crate::backend::error::BackendError;
use crate::backend::groups::activity::{self, FeedCursor};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::validation::validate_pagination;
use crate::shared::{Activity, ActivityQuery};

/// Newest first; pass the last entry's `id` as `before_id` for the next page
pub async fn list_activity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<Uuid>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<Activity>>, BackendError> {
    require_member(&state, group_id, user.id).await?;
    let (limit, _) = validate_pagination(query.limit, None)?;
    let cursor = FeedCursor {
        before: query.before,
        before_id: query.before_id,
    };
    Ok(Json(activity::list_activity(&state.db, group_id, limit, cursor).await?))
}
