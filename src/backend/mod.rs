//! Backend Module
//!
//! This module contains all server-side code for CodePocket. It is only
//! compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, database, application state, startup
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Accounts, password hashing, JWT sessions, profile
//! - **`middleware`** - Caller extractors (`AuthUser`, `AdminUser`, `ApiKeyUser`)
//! - **`snippets`** - Snippet CRUD, search, favorites, archive, stats
//! - **`folders`** - Per-user folders
//! - **`groups`** - Groups, members, invitations, sharing, activity feed
//! - **`api_keys`** - Key issuance and revocation
//! - **`external`** - API-key authenticated endpoints for the editor
//! - **`admin`** - Site statistics, user management, audit log
//! - **`realtime`** - Per-user change notifications over SSE
//! - **`cache`** - TTL query cache with pattern invalidation
//! - **`rate_limit`** - Fixed-window limiters and their middleware
//! - **`audit`** - Security event log
//! - **`error`** - `BackendError` and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Config, database, state, init
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Extractors
//! ├── snippets/       - Snippets and archive
//! ├── folders/        - Folders
//! ├── groups/         - Groups and sharing
//! ├── api_keys/       - API keys
//! ├── external/       - Editor API
//! ├── admin/          - Admin panel
//! ├── realtime/       - Event broadcasting
//! ├── error/          - Error types
//! ├── cache.rs
//! ├── rate_limit.rs
//! └── audit.rs
//! ```
//!
//! # State Management
//!
//! Handlers share an `AppState` holding the configuration, the SQLite pool,
//! the cache, the rate limiters, the realtime hub and the audit logger.
//! Every piece is cheap to clone and extractable on its own via `FromRef`.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Caller extractors
pub mod middleware;

/// Real-time update system
pub mod realtime;

/// Query cache
pub mod cache;

/// Rate limiting
pub mod rate_limit;

/// Audit log
pub mod audit;

/// Snippets
pub mod snippets;

/// Folders
pub mod folders;

/// Groups and sharing
pub mod groups;

/// API keys
pub mod api_keys;

/// API-key authenticated endpoints
pub mod external;

/// Admin panel
pub mod admin;

/// Re-export commonly used types
pub use error::BackendError;
pub use realtime::{handle_realtime_subscription, RealtimeHub};
pub use server::create_app;
