/**
 * Group Member Handlers
 *
 * - `GET /api/groups/{id}/members`
 * - `DELETE /api/groups/{id}/members/{user_id}` - remove or leave
 * - `PATCH /api/groups/{id}/members/{user_id}` - owner changes a role
 *
 * Removal rules: the owner removes anyone but themself, an admin removes
 * plain members, and any non-owner member may leave.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use super::{log_activity, require_member, require_owner};
use crate::backend::error::BackendError;
use crate::backend::groups::db;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::{ActivityKind, GroupMember, GroupRole, UpdateMemberRoleRequest};

pub async fn list_members(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<GroupMember>>, BackendError> {
    require_member(&state, group_id, user.id).await?;
    Ok(Json(db::list_members(&state.db, group_id).await?))
}

pub async fn remove_member(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((group_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, BackendError> {
    let caller_role = require_member(&state, group_id, user.id).await?;

    if member_id == user.id {
        if caller_role == GroupRole::Owner {
            return Err(BackendError::conflict("The group owner cannot leave the group"));
        }
        db::remove_member(&state.db, group_id, user.id).await?;
        log_activity(
            &state,
            group_id,
            &user,
            ActivityKind::MemberLeft,
            serde_json::json!({ "user_id": user.id, "username": user.username }),
        )
        .await?;
        tracing::info!("{} left group {}", user.username, group_id);
        return Ok(StatusCode::NO_CONTENT);
    }

    let target_role = db::member_role(&state.db, group_id, member_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Member not found"))?;

    let allowed = match caller_role {
        GroupRole::Owner => true,
        GroupRole::Admin => target_role == GroupRole::Member,
        GroupRole::Member => false,
    };
    if !allowed {
        return Err(BackendError::forbidden("You cannot remove this member"));
    }

    db::remove_member(&state.db, group_id, member_id).await?;
    log_activity(
        &state,
        group_id,
        &user,
        ActivityKind::MemberRemoved,
        serde_json::json!({ "user_id": member_id }),
    )
    .await?;

    tracing::info!("{} removed {} from group {}", user.username, member_id, group_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_member_role(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((group_id, member_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateMemberRoleRequest>,
) -> Result<Json<Vec<GroupMember>>, BackendError> {
    require_owner(&state, group_id, user.id).await?;

    if request.role == GroupRole::Owner {
        return Err(BackendError::bad_request("Role must be admin or member"));
    }
    if member_id == user.id {
        return Err(BackendError::conflict("The group owner cannot change their own role"));
    }
    if !db::set_member_role(&state.db, group_id, member_id, request.role).await? {
        return Err(BackendError::not_found("Member not found"));
    }

    log_activity(
        &state,
        group_id,
        &user,
        ActivityKind::MemberRoleChanged,
        serde_json::json!({ "user_id": member_id, "role": request.role.as_str() }),
    )
    .await?;

    Ok(Json(db::list_members(&state.db, group_id).await?))
}
