//! Authentication Module
//!
//! This module handles user accounts, password hashing and JWT sessions.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User rows and database operations
//! ├── sessions.rs     - JWT token management
//! ├── passwords.rs    - bcrypt hashing on the blocking pool
//! └── handlers/       - HTTP handlers (signup, login, me, profile)
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: username, email, password → user created → JWT returned
//! 2. **Login**: username or email + password → verified → JWT returned
//! 3. **Requests**: `Authorization: Bearer <jwt>` → `AuthUser` extractor
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Tokens are HS256 JWTs signed with the configured secret
//! - Token lifetime comes from configuration (30 days by default)
//! - Invalid credentials return 401 without saying which part was wrong

/// User rows and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// Password hashing
pub mod passwords;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::types::{AuthResponse, LoginRequest, SignupRequest};
pub use handlers::{get_me, login, signup};
