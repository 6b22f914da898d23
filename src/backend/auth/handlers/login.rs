/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /api/auth/login.
 *
 * # Authentication Process
 *
 * 1. Look up user by username or email
 * 2. Verify password using bcrypt
 * 3. Refuse disabled accounts
 * 4. Generate JWT token and return it with the user
 *
 * # Security
 *
 * - Unknown users, wrong passwords and disabled accounts are all 401
 * - Failed attempts are written to the audit log
 */

use axum::{extract::State, response::Json};

use crate::backend::audit;
use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::passwords::verify_password;
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::get_user_by_login;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Login handler
///
/// # Example Request
///
/// ```http
/// POST /api/auth/login HTTP/1.1
/// Content-Type: application/json
///
/// {"username": "alice", "password": "securepassword123"}
/// ```
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let identifier = request.username.trim().to_string();
    tracing::info!("Login request for: {}", identifier);

    let found = get_user_by_login(&state.db, &identifier).await?;
    let verified = match &found {
        Some(record) => verify_password(&request.password, &record.password_hash).await?,
        None => false,
    };

    let record = match found {
        Some(record) if verified => record,
        found => {
            tracing::warn!("Failed login for {}", identifier);
            state
                .audit
                .record(
                    found.map(|r| r.id),
                    audit::USER_LOGIN_FAILED,
                    Some(identifier),
                    serde_json::json!({}),
                )
                .await;
            return Err(BackendError::unauthorized("Invalid username or password"));
        }
    };

    if record.is_disabled {
        tracing::warn!("Login refused for disabled account {}", record.username);
        return Err(BackendError::unauthorized("Account is disabled"));
    }

    let user = record.to_user();
    let token = create_token(&state.config.jwt_secret, state.config.token_ttl, &user)?;

    state
        .audit
        .record(Some(user.id), audit::USER_LOGIN, None, serde_json::json!({}))
        .await;

    tracing::info!("User logged in: {}", user.username);
    Ok(Json(AuthResponse { token, user }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::handlers::signup::signup;
    use crate::backend::auth::handlers::types::SignupRequest;
    use crate::backend::auth::users::update_account_flags;
    use crate::backend::server::config::ServerConfig;
    use crate::backend::server::init::build_state;
    use axum::http::StatusCode;

    async fn state_with_alice() -> (AppState, uuid::Uuid) {
        let state = build_state(ServerConfig::ephemeral()).await.unwrap();
        let (_, Json(created)) = signup(
            State(state.clone()),
            Json(SignupRequest {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "password123".to_string(),
            }),
        )
        .await
        .unwrap();
        (state, created.user.id)
    }

    fn login_request(username: &str, password: &str) -> Json<LoginRequest> {
        Json(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    #[tokio::test]
    async fn test_login_with_username_or_email() {
        let (state, id) = state_with_alice().await;

        let Json(by_name) = login(State(state.clone()), login_request("alice", "password123"))
            .await
            .unwrap();
        assert_eq!(by_name.user.id, id);

        let Json(by_email) = login(State(state), login_request("ALICE@example.com", "password123"))
            .await
            .unwrap();
        assert_eq!(by_email.user.id, id);
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_audited() {
        let (state, _) = state_with_alice().await;
        let err = login(State(state.clone()), login_request("alice", "wrongpass1"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let events = state.audit.list_events(10, 0, Some(audit::USER_LOGIN_FAILED)).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (state, _) = state_with_alice().await;
        let err = login(State(state), login_request("nobody", "password123"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_disabled_account() {
        let (state, id) = state_with_alice().await;
        update_account_flags(&state.db, id, None, Some(true)).await.unwrap();

        let err = login(State(state), login_request("alice", "password123"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
