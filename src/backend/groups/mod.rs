//! Groups
//!
//! Shared workspaces: membership with roles, invitations for existing
//! accounts, snippets shared into the group, and an activity feed pushed to
//! members in real time.
//!
//! ```text
//! groups/
//! ├── mod.rs          - Module exports
//! ├── db.rs           - Groups, members, shared snippets
//! ├── invitations.rs  - Invitation queries (accept is transactional)
//! ├── activity.rs     - Activity feed queries
//! └── handlers/       - HTTP handlers
//! ```

pub mod activity;
pub mod db;
pub mod handlers;
pub mod invitations;
