//! Real-time Update Module
//!
//! Pushes change notifications to the users they concern over Server-Sent
//! Events. This replaces polling: the web UI and the editor extension keep
//! one `/api/realtime` stream open and refresh what changed.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - RealtimeHub, per-user broadcast channels
//! └── subscription.rs - SSE subscription handler
//! ```
//!
//! # Event Types
//!
//! - `snippet` - A snippet was created, updated, archived, restored or removed
//! - `folder` - A folder changed
//! - `group` - New activity in one of the caller's groups
//! - `invitation` - An invitation addressed to the caller
//! - `notification` - Free-form notices

/// Per-user broadcast channels
pub mod broadcast;

/// SSE subscription handler
pub mod subscription;

pub use broadcast::RealtimeHub;
pub use subscription::handle_realtime_subscription;
