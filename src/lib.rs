// Increase recursion limit for complex async operations
#![recursion_limit = "256"]

//! CodePocket - Main Library
//!
//! CodePocket is a personal code-snippet manager: users save, tag, search and
//! organize snippets into folders, share them with groups, and reach them
//! from their editor through API keys.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between server and client
//!   - Snippet, folder, group and API key bodies
//!   - Realtime event types, validators, error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server over a SQLite store
//!   - JWT sessions, API keys, admin panel
//!   - Per-user realtime change notifications (SSE)
//!
//! - **`client`** - Async client for the external `/api/v1` API
//!
//! # Feature Flags
//!
//! - **`ssr`** - Enables the backend modules and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use codepocket::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await?;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation failures, usable on both sides
//! - `backend::BackendError` maps every failure to an HTTP status and a
//!   `{"error", "status"}` JSON body
//! - `client::ClientError` for the editor client

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Editor extension client
pub mod client;
