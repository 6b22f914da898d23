/**
 * Group Sharing Handlers
 *
 * - `POST /api/groups/{id}/snippets` - share one of the caller's live snippets
 * - `GET /api/groups/{id}/snippets` - live snippets shared into the group
 * - `DELETE /api/groups/{id}/snippets/{snippet_id}` - unshare
 *
 * Unsharing is allowed for whoever shared the snippet, its owner, and the
 * group's owner or admins.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use super::{log_activity, require_member};
use crate::backend::error::BackendError;
use crate::backend::groups::db;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::snippets::db::get_owned_snippet;
use crate::shared::{ActivityKind, ShareSnippetRequest, SharedSnippet};

pub async fn share_snippet(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<Uuid>,
    Json(request): Json<ShareSnippetRequest>,
) -> Result<StatusCode, BackendError> {
    require_member(&state, group_id, user.id).await?;

    let snippet = get_owned_snippet(&state.db, user.id, request.snippet_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Snippet not found"))?;
    if snippet.is_archived() {
        return Err(BackendError::conflict("Archived snippets cannot be shared"));
    }

    db::share_snippet(&state.db, group_id, snippet.id, user.id)
        .await
        .map_err(|e| BackendError::on_unique(e, "Snippet is already shared with this group"))?;
    log_activity(
        &state,
        group_id,
        &user,
        ActivityKind::SnippetShared,
        serde_json::json!({ "snippet_id": snippet.id, "title": snippet.title }),
    )
    .await?;

    Ok(StatusCode::CREATED)
}

pub async fn list_shared_snippets(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<SharedSnippet>>, BackendError> {
    require_member(&state, group_id, user.id).await?;
    Ok(Json(db::list_shared_snippets(&state.db, group_id).await?))
}

pub async fn unshare_snippet(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((group_id, snippet_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, BackendError> {
    let role = require_member(&state, group_id, user.id).await?;

    let (shared_by, owner_id) = db::get_share(&state.db, group_id, snippet_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Snippet is not shared with this group"))?;
    if shared_by != user.id && owner_id != user.id && !role.can_manage() {
        return Err(BackendError::forbidden("You cannot unshare this snippet"));
    }

    db::unshare_snippet(&state.db, group_id, snippet_id).await?;
    log_activity(
        &state,
        group_id,
        &user,
        ActivityKind::SnippetUnshared,
        serde_json::json!({ "snippet_id": snippet_id }),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
