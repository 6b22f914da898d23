/**
 * Signup Handler
 *
 * This module implements the user registration handler for POST /api/auth/signup.
 *
 * # Registration Process
 *
 * 1. Validate username, email and password
 * 2. Reject taken usernames (case-insensitively) and emails
 * 3. Hash password using bcrypt
 * 4. Create user, as admin when the email is listed in `admin_emails`
 * 5. Generate JWT token
 * 6. Return token and user info
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::audit;
use crate::backend::cache::keys;
use crate::backend::auth::handlers::types::{AuthResponse, SignupRequest};
use crate::backend::auth::passwords::hash_password;
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{create_user, get_user_by_email, get_user_by_username};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::validation::{validate_email, validate_password, validate_username};
use crate::shared::UserRole;

/// Sign up handler
///
/// # Errors
///
/// * `400 Bad Request` - invalid username, email or password
/// * `409 Conflict` - username or email already in use
///
/// # Example Request
///
/// ```http
/// POST /api/auth/signup HTTP/1.1
/// Content-Type: application/json
///
/// {"username": "alice", "email": "alice@example.com", "password": "securepassword123"}
/// ```
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), BackendError> {
    let username = validate_username(&request.username)?;
    let email = validate_email(&request.email)?;
    validate_password(&request.password)?;

    tracing::info!("Signup request for username: {}", username);

    if get_user_by_username(&state.db, &username).await?.is_some() {
        tracing::warn!("Username already exists: {}", username);
        return Err(BackendError::conflict("Username already taken"));
    }
    if get_user_by_email(&state.db, &email).await?.is_some() {
        tracing::warn!("Email already registered: {}", email);
        return Err(BackendError::conflict("Email already registered"));
    }

    let password_hash = hash_password(&request.password, state.config.bcrypt_cost).await?;
    let role = if state.config.is_admin_email(&email) {
        UserRole::Admin
    } else {
        UserRole::User
    };

    let record = create_user(&state.db, &username, &email, &password_hash, role)
        .await
        .map_err(|e| BackendError::on_unique(e, "Username or email already in use"))?;
    let user = record.to_user();
    state.cache.invalidate(keys::ADMIN_STATS);

    let token = create_token(&state.config.jwt_secret, state.config.token_ttl, &user)?;

    state
        .audit
        .record(
            Some(user.id),
            audit::USER_SIGNUP,
            Some(user.username.clone()),
            serde_json::json!({ "role": role.as_str() }),
        )
        .await;

    tracing::info!("User created successfully: {}", user.username);

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::server::config::ServerConfig;
    use crate::backend::server::init::build_state;

    fn request(username: &str, email: &str, password: &str) -> Json<SignupRequest> {
        Json(SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    #[tokio::test]
    async fn test_signup_success() {
        let state = build_state(ServerConfig::ephemeral()).await.unwrap();
        let (status, Json(response)) = signup(State(state), request("alice", "Alice@Example.com", "password123"))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(!response.token.is_empty());
        assert_eq!(response.user.email, "alice@example.com");
        assert_eq!(response.user.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_signup_rejects_invalid_input() {
        let state = build_state(ServerConfig::ephemeral()).await.unwrap();

        let err = signup(State(state.clone()), request("alice", "not-an-email", "password123"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = signup(State(state), request("alice", "a@example.com", "short"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signup_duplicate_username_any_case() {
        let state = build_state(ServerConfig::ephemeral()).await.unwrap();
        signup(State(state.clone()), request("alice", "a@example.com", "password123"))
            .await
            .unwrap();

        let err = signup(State(state), request("ALICE", "b@example.com", "password123"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_signup_admin_email_gets_admin_role() {
        let config = ServerConfig {
            admin_emails: vec!["root@example.com".to_string()],
            ..ServerConfig::ephemeral()
        };
        let state = build_state(config).await.unwrap();
        let (_, Json(response)) = signup(State(state), request("root", "root@example.com", "password123"))
            .await
            .unwrap();
        assert_eq!(response.user.role, UserRole::Admin);
    }
}
