/**
 * Folder Handlers
 *
 * - `POST /api/folders` - create
 * - `GET /api/folders` - list with live snippet counts
 * - `PATCH /api/folders/{id}` - rename
 * - `DELETE /api/folders/{id}` - delete (snippets are detached, not removed)
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use super::db;
use crate::backend::cache::keys;
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::validation::validate_folder_name;
use crate::shared::{ChangeAction, EventType, Folder, FolderRequest, RealtimeEvent};

const DUPLICATE_NAME: &str = "A folder with this name already exists";

fn folders_changed(state: &AppState, owner_id: Uuid, action: ChangeAction, payload: serde_json::Value) {
    state.cache.invalidate(&keys::folders(owner_id));
    state.cache.invalidate(&keys::stats(owner_id));
    state
        .realtime
        .publish(owner_id, RealtimeEvent::change(EventType::Folder, action, payload));
}

pub async fn create_folder(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<FolderRequest>,
) -> Result<(StatusCode, Json<Folder>), BackendError> {
    let name = validate_folder_name(&request.name)?;
    let folder = db::create_folder(&state.db, user.id, &name)
        .await
        .map_err(|e| BackendError::on_unique(e, DUPLICATE_NAME))?;

    tracing::info!("Folder {} created by {}", folder.id, user.username);
    folders_changed(&state, user.id, ChangeAction::Created, serde_json::to_value(&folder)?);
    Ok((StatusCode::CREATED, Json(folder)))
}

pub async fn list_folders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Folder>>, BackendError> {
    let key = keys::folders(user.id);
    if let Some(folders) = state.cache.get::<Vec<Folder>>(&key) {
        return Ok(Json(folders));
    }
    let folders = db::list_folders(&state.db, user.id).await?;
    state.cache.set(key, &folders);
    Ok(Json(folders))
}

pub async fn rename_folder(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<FolderRequest>,
) -> Result<Json<Folder>, BackendError> {
    let name = validate_folder_name(&request.name)?;
    let folder = db::rename_folder(&state.db, user.id, id, &name)
        .await
        .map_err(|e| BackendError::on_unique(e, DUPLICATE_NAME))?
        .ok_or_else(|| BackendError::not_found("Folder not found"))?;

    folders_changed(&state, user.id, ChangeAction::Updated, serde_json::to_value(&folder)?);
    Ok(Json(folder))
}

pub async fn delete_folder(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    if !db::delete_folder(&state.db, user.id, id).await? {
        return Err(BackendError::not_found("Folder not found"));
    }

    // Detached snippets show up differently in filtered lists
    state.cache.invalidate_pattern(&keys::snippets_of(user.id));
    folders_changed(&state, user.id, ChangeAction::Deleted, serde_json::json!({ "id": id }));

    tracing::info!("Folder {} deleted by {}", id, user.username);
    Ok(StatusCode::NO_CONTENT)
}
