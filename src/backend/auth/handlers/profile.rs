/**
 * Profile Handlers
 *
 * - `PATCH /api/profile` - change username, display name or bio
 * - `POST /api/profile/password` - change password (current one required)
 * - `DELETE /api/profile` - delete the account and everything it owns
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::audit;
use crate::backend::auth::handlers::types::{ChangePasswordRequest, UpdateProfileRequest};
use crate::backend::auth::passwords::{hash_password, verify_password};
use crate::backend::auth::users::{self, get_user_by_id, get_user_by_username};
use crate::backend::cache::keys;
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::validation::{validate_bio, validate_display_name, validate_password, validate_username};
use crate::shared::{SharedError, User};

/// Update the caller's profile
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>, BackendError> {
    let username = match request.username.as_deref() {
        Some(raw) => {
            let username = validate_username(raw)?;
            if let Some(existing) = get_user_by_username(&state.db, &username).await? {
                if existing.id != user.id {
                    return Err(BackendError::conflict("Username already taken"));
                }
            }
            username
        }
        None => user.username.clone(),
    };

    let display_name = match request.display_name {
        Some(value) => validate_display_name(value.as_deref())?,
        None => user.display_name.clone(),
    };
    let bio = match request.bio {
        Some(value) => validate_bio(value.as_deref())?,
        None => user.bio.clone(),
    };

    let record = users::update_profile(&state.db, user.id, &username, display_name.as_deref(), bio.as_deref())
        .await
        .map_err(|e| BackendError::on_unique(e, "Username already taken"))?;

    tracing::info!("Profile updated for {}", record.username);
    Ok(Json(record.to_user()))
}

/// Change the caller's password
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, BackendError> {
    let record = get_user_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| BackendError::not_found("Account not found"))?;

    if !verify_password(&request.current_password, &record.password_hash).await? {
        return Err(SharedError::validation("current_password", "Current password is incorrect").into());
    }
    validate_password(&request.new_password)?;

    let hash = hash_password(&request.new_password, state.config.bcrypt_cost).await?;
    users::update_password(&state.db, user.id, &hash).await?;

    state
        .audit
        .record(Some(user.id), audit::USER_PASSWORD_CHANGED, None, serde_json::json!({}))
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete the caller's account
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, BackendError> {
    if !users::delete_user(&state.db, user.id).await? {
        return Err(BackendError::not_found("Account not found"));
    }

    state.cache.invalidate_pattern(&keys::snippets_of(user.id));
    state.cache.invalidate(&keys::folders(user.id));
    state.cache.invalidate(&keys::stats(user.id));
    state.cache.invalidate(keys::ADMIN_STATS);

    state
        .audit
        .record(
            Some(user.id),
            audit::USER_DELETED,
            Some(user.username.clone()),
            serde_json::json!({}),
        )
        .await;

    tracing::info!("Account deleted: {}", user.username);
    Ok(StatusCode::NO_CONTENT)
}
