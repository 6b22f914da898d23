//! Server Module
//!
//! This module contains the code that configures and starts the Axum HTTP
//! server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── config.rs       - ServerConfig and its builder (defaults, TOML, env)
//! ├── database.rs     - SQLite pool and migrations
//! ├── state.rs        - AppState and FromRef implementations
//! └── init.rs         - State assembly, background tasks, app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::from_env`
//! 2. **Database**: connect, enable foreign keys, run migrations
//! 3. **State Creation**: cache, rate limiters, realtime hub, audit log
//! 4. **Background Tasks**: housekeeping and archive retention
//! 5. **Router Creation**: all routes and middleware

/// Server configuration loading
pub mod config;

/// SQLite connection pool
pub mod database;

/// Application state management
pub mod state;

/// Server initialization
pub mod init;

pub use config::ServerConfig;
pub use init::{build_state, create_app};
pub use state::AppState;
