/**
 * API Key Handlers
 *
 * - `POST /api/keys` - create; the full key is only returned here
 * - `GET /api/keys` - list without secrets
 * - `DELETE /api/keys/{id}` - revoke
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use super::db;
use crate::backend::audit;
use crate::backend::cache::keys;
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::validation::validate_api_key_name;
use crate::shared::{ApiKeySummary, CreateApiKeyRequest, CreatedApiKey};

pub use super::db::MAX_ACTIVE_KEYS;

pub async fn create_api_key(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<CreatedApiKey>), BackendError> {
    let name = validate_api_key_name(&request.name)?;

    let created = db::create_key(&state.db, user.id, &name, MAX_ACTIVE_KEYS)
        .await?
        .ok_or_else(|| {
            BackendError::conflict(format!("At most {} active API keys are allowed", MAX_ACTIVE_KEYS))
        })?;
    state.cache.invalidate(keys::ADMIN_STATS);
    state
        .audit
        .record(
            Some(user.id),
            audit::API_KEY_CREATED,
            Some(created.prefix.clone()),
            serde_json::json!({ "name": created.name }),
        )
        .await;

    tracing::info!("API key {} created by {}", created.prefix, user.username);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_api_keys(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ApiKeySummary>>, BackendError> {
    Ok(Json(db::list_keys(&state.db, user.id).await?))
}

pub async fn revoke_api_key(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    let key = db::get_key(&state.db, user.id, id)
        .await?
        .ok_or_else(|| BackendError::not_found("API key not found"))?;
    if !db::revoke_key(&state.db, user.id, id).await? {
        return Err(BackendError::conflict("API key is already revoked"));
    }
    state.cache.invalidate(keys::ADMIN_STATS);

    state
        .audit
        .record(Some(user.id), audit::API_KEY_REVOKED, Some(key.prefix), serde_json::json!({}))
        .await;
    Ok(StatusCode::NO_CONTENT)
}
