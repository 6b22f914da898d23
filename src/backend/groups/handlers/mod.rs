//! Group Handlers Module
//!
//! ```text
//! handlers/
//! ├── mod.rs          - Permission helpers and exports
//! ├── groups.rs       - Create, list, get, update, delete
//! ├── members.rs      - Member listing, removal, role changes
//! ├── invitations.rs  - Invite, revoke, accept, decline
//! ├── sharing.rs      - Snippets shared into a group
//! └── activity_feed.rs - Activity feed
//! ```
//!
//! # Permissions
//!
//! Non-members get 404 for everything under `/api/groups/{id}`. Members who
//! lack the required role get 403.

use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::groups::{activity, db};
use crate::backend::server::state::AppState;
use crate::shared::{Activity, ActivityKind, EventType, GroupRole, RealtimeEvent, User};

pub mod activity_feed;
pub mod groups;
pub mod invitations;
pub mod members;
pub mod sharing;

pub use activity_feed::list_activity;
pub use groups::{create_group, delete_group, get_group, list_groups, update_group};
pub use invitations::{
    accept_invitation, decline_invitation, invite_member, list_group_invitations, list_my_invitations,
    revoke_invitation,
};
pub use members::{list_members, remove_member, update_member_role};
pub use sharing::{list_shared_snippets, share_snippet, unshare_snippet};

/// Caller's role in the group; 404 when they are not a member
pub(crate) async fn require_member(state: &AppState, group_id: Uuid, user_id: Uuid) -> Result<GroupRole, BackendError> {
    db::member_role(&state.db, group_id, user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Group not found"))
}

/// Owner or admin
pub(crate) async fn require_manager(state: &AppState, group_id: Uuid, user_id: Uuid) -> Result<GroupRole, BackendError> {
    let role = require_member(state, group_id, user_id).await?;
    if !role.can_manage() {
        return Err(BackendError::forbidden("Only group owners and admins can do this"));
    }
    Ok(role)
}

pub(crate) async fn require_owner(state: &AppState, group_id: Uuid, user_id: Uuid) -> Result<(), BackendError> {
    match require_member(state, group_id, user_id).await? {
        GroupRole::Owner => Ok(()),
        _ => Err(BackendError::forbidden("Only the group owner can do this")),
    }
}

/// Append to the feed and push the entry to every current member
pub(crate) async fn log_activity(
    state: &AppState,
    group_id: Uuid,
    actor: &User,
    kind: ActivityKind,
    details: serde_json::Value,
) -> Result<Activity, BackendError> {
    let entry = activity::record_activity(&state.db, group_id, actor, kind, details).await?;
    let members = db::member_ids(&state.db, group_id).await?;
    let event = RealtimeEvent::new(EventType::Group, serde_json::to_value(&entry)?);
    let delivered = state.realtime.publish_many(members, &event);
    tracing::debug!("Group activity {} delivered to {} subscribers", kind.as_str(), delivered);
    Ok(entry)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::backend::auth::users::create_user;
    use crate::backend::middleware::auth::AuthUser;
    use crate::backend::server::config::ServerConfig;
    use crate::backend::server::init::build_state;
    use crate::backend::server::state::AppState;
    use crate::shared::UserRole;

    pub async fn state() -> AppState {
        build_state(ServerConfig::ephemeral()).await.unwrap()
    }

    pub async fn user(state: &AppState, name: &str) -> AuthUser {
        let record = create_user(&state.db, name, &format!("{}@example.com", name), "h", UserRole::User)
            .await
            .unwrap();
        AuthUser(record.to_user())
    }
}
