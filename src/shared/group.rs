//! Group Data Structures
//!
//! Groups are shared workspaces. A group has one owner, any number of admins
//! and members, pending invitations, snippets shared into it, and an
//! append-only activity feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::snippet::{double_option, Snippet};

/// Role of a member within a group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Owner,
    Admin,
    Member,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Owner => "owner",
            GroupRole::Admin => "admin",
            GroupRole::Member => "member",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "owner" => Some(GroupRole::Owner),
            "admin" => Some(GroupRole::Admin),
            "member" => Some(GroupRole::Member),
            _ => None,
        }
    }

    /// Owners and admins may invite and moderate
    pub fn can_manage(&self) -> bool {
        matches!(self, GroupRole::Owner | GroupRole::Admin)
    }
}

/// Status of a group invitation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Revoked,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
            InvitationStatus::Revoked => "revoked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(InvitationStatus::Pending),
            "accepted" => Some(InvitationStatus::Accepted),
            "declined" => Some(InvitationStatus::Declined),
            "revoked" => Some(InvitationStatus::Revoked),
            _ => None,
        }
    }
}

/// Kind of entry in a group's activity feed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    GroupCreated,
    GroupUpdated,
    MemberJoined,
    MemberLeft,
    MemberRemoved,
    MemberRoleChanged,
    InvitationSent,
    InvitationDeclined,
    InvitationRevoked,
    SnippetShared,
    SnippetUnshared,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::GroupCreated => "group_created",
            ActivityKind::GroupUpdated => "group_updated",
            ActivityKind::MemberJoined => "member_joined",
            ActivityKind::MemberLeft => "member_left",
            ActivityKind::MemberRemoved => "member_removed",
            ActivityKind::MemberRoleChanged => "member_role_changed",
            ActivityKind::InvitationSent => "invitation_sent",
            ActivityKind::InvitationDeclined => "invitation_declined",
            ActivityKind::InvitationRevoked => "invitation_revoked",
            ActivityKind::SnippetShared => "snippet_shared",
            ActivityKind::SnippetUnshared => "snippet_unshared",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let kind = match s {
            "group_created" => ActivityKind::GroupCreated,
            "group_updated" => ActivityKind::GroupUpdated,
            "member_joined" => ActivityKind::MemberJoined,
            "member_left" => ActivityKind::MemberLeft,
            "member_removed" => ActivityKind::MemberRemoved,
            "member_role_changed" => ActivityKind::MemberRoleChanged,
            "invitation_sent" => ActivityKind::InvitationSent,
            "invitation_declined" => ActivityKind::InvitationDeclined,
            "invitation_revoked" => ActivityKind::InvitationRevoked,
            "snippet_shared" => ActivityKind::SnippetShared,
            "snippet_unshared" => ActivityKind::SnippetUnshared,
            _ => return None,
        };
        Some(kind)
    }
}

/// A group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A group as seen by one of its members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupSummary {
    #[serde(flatten)]
    pub group: Group,
    /// The caller's role
    pub role: GroupRole,
    pub member_count: i64,
}

/// A member of a group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupMember {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// An invitation to join a group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invitation {
    pub id: Uuid,
    pub group_id: Uuid,
    pub group_name: String,
    pub inviter_id: Uuid,
    pub inviter_username: String,
    pub invitee_id: Uuid,
    pub invitee_username: String,
    #[serde(default)]
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// Entry in a group's activity feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Activity {
    pub id: Uuid,
    pub group_id: Uuid,
    /// `None` once the actor's account is deleted
    pub actor_id: Option<Uuid>,
    /// Username at the time of the action
    pub actor_username: String,
    pub kind: ActivityKind,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A snippet shared into a group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SharedSnippet {
    #[serde(flatten)]
    pub snippet: Snippet,
    pub shared_by: Uuid,
    pub shared_by_username: String,
    pub shared_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateGroupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

/// Invite an existing user, addressed by username or email
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InviteRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareSnippetRequest {
    pub snippet_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: GroupRole,
}

/// Cursor pagination for the activity feed
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActivityQuery {
    #[serde(default)]
    pub limit: Option<i64>,
    /// Only entries strictly older than this instant
    #[serde(default)]
    pub before: Option<DateTime<Utc>>,
    /// Id of the last entry of the previous page
    #[serde(default)]
    pub before_id: Option<Uuid>,
}
