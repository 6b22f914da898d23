/**
 * Invitation Handlers
 *
 * Group side (owner/admin):
 * - `POST /api/groups/{id}/invitations` - invite by username or email
 * - `GET /api/groups/{id}/invitations` - pending invitations
 * - `DELETE /api/groups/{id}/invitations/{invitation_id}` - revoke
 *
 * Invitee side:
 * - `GET /api/invitations` - the caller's pending invitations
 * - `POST /api/invitations/{id}/accept`
 * - `POST /api/invitations/{id}/decline`
 *
 * Invitations are pushed to the invitee as `invitation` realtime events.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use super::{log_activity, require_manager};
use crate::backend::auth::users::{get_user_by_email, get_user_by_username};
use crate::backend::error::BackendError;
use crate::backend::groups::{db, invitations};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::{
    ActivityKind, ChangeAction, EventType, GroupSummary, Invitation, InvitationStatus, InviteRequest, RealtimeEvent,
};

fn notify_invitee(state: &AppState, invitation: &Invitation, action: ChangeAction) -> Result<(), BackendError> {
    let event = RealtimeEvent::change(EventType::Invitation, action, serde_json::to_value(invitation)?);
    state.realtime.publish(invitation.invitee_id, event);
    Ok(())
}

/// The caller's own pending invitation, or the matching error
async fn pending_invitation_for(state: &AppState, id: Uuid, invitee_id: Uuid) -> Result<Invitation, BackendError> {
    let invitation = invitations::get_invitation(&state.db, id)
        .await?
        .filter(|i| i.invitee_id == invitee_id)
        .ok_or_else(|| BackendError::not_found("Invitation not found"))?;
    if invitation.status != InvitationStatus::Pending {
        return Err(BackendError::conflict("Invitation has already been answered"));
    }
    Ok(invitation)
}

pub async fn invite_member(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<Uuid>,
    Json(request): Json<InviteRequest>,
) -> Result<(StatusCode, Json<Invitation>), BackendError> {
    require_manager(&state, group_id, user.id).await?;

    let username = request.username.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let email = request.email.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let invitee = match (username, email) {
        (Some(username), _) => get_user_by_username(&state.db, username).await?,
        (None, Some(email)) => get_user_by_email(&state.db, email).await?,
        (None, None) => return Err(BackendError::bad_request("Provide a username or an email")),
    }
    .ok_or_else(|| BackendError::not_found("User not found"))?;

    if db::member_role(&state.db, group_id, invitee.id).await?.is_some() {
        return Err(BackendError::conflict("User is already a member"));
    }
    if invitations::has_pending(&state.db, group_id, invitee.id).await? {
        return Err(BackendError::conflict("User already has a pending invitation"));
    }

    let invitation = invitations::create_invitation(&state.db, group_id, user.id, invitee.id)
        .await
        .map_err(|e| BackendError::on_unique(e, "User already has a pending invitation"))?;
    log_activity(
        &state,
        group_id,
        &user,
        ActivityKind::InvitationSent,
        serde_json::json!({ "invitee_id": invitee.id, "invitee_username": invitee.username }),
    )
    .await?;
    notify_invitee(&state, &invitation, ChangeAction::Created)?;

    tracing::info!("{} invited {} to group {}", user.username, invitee.username, group_id);
    Ok((StatusCode::CREATED, Json(invitation)))
}

pub async fn list_group_invitations(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<Invitation>>, BackendError> {
    require_manager(&state, group_id, user.id).await?;
    Ok(Json(invitations::list_pending_for_group(&state.db, group_id).await?))
}

pub async fn revoke_invitation(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((group_id, invitation_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, BackendError> {
    require_manager(&state, group_id, user.id).await?;

    let mut invitation = invitations::get_invitation(&state.db, invitation_id)
        .await?
        .filter(|i| i.group_id == group_id)
        .ok_or_else(|| BackendError::not_found("Invitation not found"))?;
    if !invitations::resolve_invitation(&state.db, invitation_id, InvitationStatus::Revoked).await? {
        return Err(BackendError::conflict("Only pending invitations can be revoked"));
    }
    invitation.status = InvitationStatus::Revoked;

    log_activity(
        &state,
        group_id,
        &user,
        ActivityKind::InvitationRevoked,
        serde_json::json!({ "invitee_id": invitation.invitee_id, "invitee_username": invitation.invitee_username }),
    )
    .await?;
    notify_invitee(&state, &invitation, ChangeAction::Deleted)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_my_invitations(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Invitation>>, BackendError> {
    Ok(Json(invitations::list_pending_for_user(&state.db, user.id).await?))
}

pub async fn accept_invitation(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupSummary>, BackendError> {
    let invitation = pending_invitation_for(&state, id, user.id).await?;
    if !invitations::accept_invitation(&state.db, id, user.id).await? {
        return Err(BackendError::conflict("Invitation has already been answered"));
    }

    log_activity(
        &state,
        invitation.group_id,
        &user,
        ActivityKind::MemberJoined,
        serde_json::json!({ "user_id": user.id, "username": user.username }),
    )
    .await?;

    tracing::info!("{} joined group {}", user.username, invitation.group_id);
    let summary = db::get_summary(&state.db, invitation.group_id, user.id)
        .await?
        .ok_or_else(|| BackendError::not_found("Group not found"))?;
    Ok(Json(summary))
}

pub async fn decline_invitation(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    let invitation = pending_invitation_for(&state, id, user.id).await?;
    if !invitations::resolve_invitation(&state.db, id, InvitationStatus::Declined).await? {
        return Err(BackendError::conflict("Invitation has already been answered"));
    }

    log_activity(
        &state,
        invitation.group_id,
        &user,
        ActivityKind::InvitationDeclined,
        serde_json::json!({ "user_id": user.id, "username": user.username }),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::groups::handlers::test_support::{state, user};
    use crate::shared::GroupRole;

    async fn setup() -> (AppState, AuthUser, AuthUser, Uuid) {
        let state = state().await;
        let owner = user(&state, "trent").await;
        let invitee = user(&state, "ursula").await;
        let group = db::create_group(&state.db, owner.0.id, "Ops", None).await.unwrap();
        (state, owner, invitee, group.id)
    }

    fn by_name(name: &str) -> Json<InviteRequest> {
        Json(InviteRequest {
            username: Some(name.to_string()),
            email: None,
        })
    }

    #[tokio::test]
    async fn test_invite_accept_flow() {
        let (state, owner, invitee, group_id) = setup().await;
        let mut rx = state.realtime.subscribe(invitee.0.id);

        let (status, Json(invitation)) =
            invite_member(State(state.clone()), owner.clone(), Path(group_id), by_name("ursula"))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::Invitation);

        let err = invite_member(State(state.clone()), owner, Path(group_id), by_name("ursula"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let Json(mine) = list_my_invitations(State(state.clone()), invitee.clone()).await.unwrap();
        assert_eq!(mine.len(), 1);

        let Json(summary) = accept_invitation(State(state.clone()), invitee.clone(), Path(invitation.id))
            .await
            .unwrap();
        assert_eq!(summary.role, GroupRole::Member);
        assert_eq!(summary.member_count, 2);

        let err = decline_invitation(State(state), invitee, Path(invitation.id)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invite_by_email_and_unknown_user() {
        let (state, owner, _, group_id) = setup().await;
        let request = Json(InviteRequest {
            username: None,
            email: Some("URSULA@example.com".into()),
        });
        invite_member(State(state.clone()), owner.clone(), Path(group_id), request)
            .await
            .unwrap();

        let err = invite_member(State(state), owner, Path(group_id), by_name("nobody"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_only_invitee_answers() {
        let (state, owner, invitee, group_id) = setup().await;
        let (_, Json(invitation)) = invite_member(State(state.clone()), owner.clone(), Path(group_id), by_name("ursula"))
            .await
            .unwrap();

        let err = accept_invitation(State(state.clone()), owner, Path(invitation.id))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        decline_invitation(State(state.clone()), invitee, Path(invitation.id)).await.unwrap();
        let stored = invitations::get_invitation(&state.db, invitation.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InvitationStatus::Declined);
    }

    #[tokio::test]
    async fn test_revoke_and_member_cannot_invite() {
        let (state, owner, invitee, group_id) = setup().await;
        let (_, Json(invitation)) = invite_member(State(state.clone()), owner.clone(), Path(group_id), by_name("ursula"))
            .await
            .unwrap();

        revoke_invitation(State(state.clone()), owner.clone(), Path((group_id, invitation.id)))
            .await
            .unwrap();
        let err = revoke_invitation(State(state.clone()), owner.clone(), Path((group_id, invitation.id)))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        db::add_member(&state.db, group_id, invitee.0.id, GroupRole::Member).await.unwrap();
        let err = invite_member(State(state), invitee, Path(group_id), by_name("trent"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
