//! Admin panel
//!
//! Site-wide counters, account moderation and the audit log.

pub mod db;
pub mod handlers;

pub use handlers::{delete_user, get_stats, list_events, list_users, update_user};
