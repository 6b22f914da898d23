/**
 * Group CRUD Handlers
 *
 * - `POST /api/groups` - create; the caller becomes the owner
 * - `GET /api/groups` - groups the caller belongs to
 * - `GET /api/groups/{id}` - members only
 * - `PATCH /api/groups/{id}` - owner only
 * - `DELETE /api/groups/{id}` - owner only
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use super::{log_activity, require_owner};
use crate::backend::cache::keys;
use crate::backend::error::BackendError;
use crate::backend::groups::db;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::validation::{validate_description, validate_group_name};
use crate::shared::{
    ActivityKind, ChangeAction, CreateGroupRequest, EventType, GroupSummary, RealtimeEvent, UpdateGroupRequest,
};

pub async fn create_group(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupSummary>), BackendError> {
    let name = validate_group_name(&request.name)?;
    let description = validate_description(request.description.as_deref())?;

    let group = db::create_group(&state.db, user.id, &name, description.as_deref()).await?;
    state.cache.invalidate(keys::ADMIN_STATS);
    log_activity(
        &state,
        group.id,
        &user,
        ActivityKind::GroupCreated,
        serde_json::json!({ "name": group.name }),
    )
    .await?;

    tracing::info!("Group {} created by {}", group.id, user.username);
    Ok((
        StatusCode::CREATED,
        Json(GroupSummary {
            group,
            role: crate::shared::GroupRole::Owner,
            member_count: 1,
        }),
    ))
}

pub async fn list_groups(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<GroupSummary>>, BackendError> {
    Ok(Json(db::list_groups_for(&state.db, user.id).await?))
}

pub async fn get_group(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupSummary>, BackendError> {
    let summary = db::get_summary(&state.db, id, user.id)
        .await?
        .ok_or_else(|| BackendError::not_found("Group not found"))?;
    Ok(Json(summary))
}

pub async fn update_group(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateGroupRequest>,
) -> Result<Json<GroupSummary>, BackendError> {
    require_owner(&state, id, user.id).await?;
    let current = db::get_group(&state.db, id)
        .await?
        .ok_or_else(|| BackendError::not_found("Group not found"))?;

    let name = match request.name.as_deref() {
        Some(name) => validate_group_name(name)?,
        None => current.name,
    };
    let description = match request.description {
        Some(description) => validate_description(description.as_deref())?,
        None => current.description,
    };

    db::update_group(&state.db, id, &name, description.as_deref())
        .await?
        .ok_or_else(|| BackendError::not_found("Group not found"))?;
    log_activity(
        &state,
        id,
        &user,
        ActivityKind::GroupUpdated,
        serde_json::json!({ "name": name, "description": description }),
    )
    .await?;

    let summary = db::get_summary(&state.db, id, user.id)
        .await?
        .ok_or_else(|| BackendError::not_found("Group not found"))?;
    Ok(Json(summary))
}

pub async fn delete_group(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    require_owner(&state, id, user.id).await?;

    let members = db::member_ids(&state.db, id).await?;
    if !db::delete_group(&state.db, id).await? {
        return Err(BackendError::not_found("Group not found"));
    }
    state.cache.invalidate(keys::ADMIN_STATS);

    let event = RealtimeEvent::change(EventType::Group, ChangeAction::Deleted, serde_json::json!({ "group_id": id }));
    state.realtime.publish_many(members, &event);

    tracing::info!("Group {} deleted by {}", id, user.username);
    Ok(StatusCode::NO_CONTENT)
}
