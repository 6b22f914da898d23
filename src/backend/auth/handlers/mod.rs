//! Authentication Handlers Module
//!
//! This module contains all HTTP handlers for authentication and profile
//! endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request and response types
//! ├── signup.rs   - User registration handler
//! ├── login.rs    - User authentication handler
//! ├── me.rs       - Get current user handler
//! └── profile.rs  - Profile, password and account deletion
//! ```
//!
//! # Handlers
//!
//! - **`signup`** - POST /api/auth/signup
//! - **`login`** - POST /api/auth/login
//! - **`get_me`** - GET /api/auth/me
//! - **`update_profile`** - PATCH /api/profile
//! - **`change_password`** - POST /api/profile/password
//! - **`delete_account`** - DELETE /api/profile

/// Request and response types
pub mod types;

/// Signup handler
pub mod signup;

/// Login handler
pub mod login;

/// Get current user handler
pub mod me;

/// Profile management handlers
pub mod profile;

pub use types::{AuthResponse, ChangePasswordRequest, LoginRequest, SignupRequest, UpdateProfileRequest};

pub use login::login;
pub use me::get_me;
pub use profile::{change_password, delete_account, update_profile};
pub use signup::signup;
