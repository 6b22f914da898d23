//! Middleware Module
//!
//! Request processing that runs before handlers.
//!
//! - **`auth`** - Extractors that authenticate the caller (`AuthUser`,
//!   `AdminUser`, `ApiKeyUser`)
//!
//! Rate limiting middleware lives in `backend::rate_limit` next to the
//! limiter it drives.

pub mod auth;

pub use auth::{AdminUser, ApiKeyUser, AuthUser};
