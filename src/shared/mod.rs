//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the server and the editor client. These types are the JSON bodies of the
//! HTTP API, plus the input validators both sides run.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types that can be used
//! in both server and client code. All types are designed for serialization
//! and transmission over HTTP.

/// User accounts
pub mod user;

/// Snippet data structures
pub mod snippet;

/// Folder data structures
pub mod folder;

/// Groups, invitations and activity
pub mod group;

/// API key data structures
pub mod api_key;

/// Admin panel data structures
pub mod admin;

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Input validation and sanitization
pub mod validation;

/// Client configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use user::{User, UserRole};
pub use snippet::{
    CreateSnippetRequest, ListSnippetsResponse, Snippet, SnippetQuery, SnippetSort, SnippetStats,
    UpdateSnippetRequest,
};
pub use folder::{Folder, FolderRequest};
pub use group::{
    Activity, ActivityKind, ActivityQuery, CreateGroupRequest, Group, GroupMember, GroupRole,
    GroupSummary, Invitation, InvitationStatus, InviteRequest, ShareSnippetRequest, SharedSnippet,
    UpdateGroupRequest, UpdateMemberRoleRequest,
};
pub use api_key::{ApiKeySummary, CreateApiKeyRequest, CreatedApiKey};
pub use admin::{AdminStats, AdminUserQuery, AdminUserUpdate, AuditEvent, AuditQuery};
pub use event::{ChangeAction, EventType, RealtimeEvent};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
