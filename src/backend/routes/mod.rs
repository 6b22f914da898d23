//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, health, rate-limit layers
//! └── api_routes.rs   - Session API, group and admin routes
//! ```

/// Main router creation and route assembly
pub mod router;

/// API route groups
pub mod api_routes;

pub use router::create_router;
