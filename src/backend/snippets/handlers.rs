/**
 * Snippet Handlers
 *
 * Session-authenticated snippet endpoints:
 *
 * - `POST /api/snippets`, `GET /api/snippets`
 * - `GET|PATCH|DELETE /api/snippets/{id}`
 * - `POST /api/snippets/{id}/favorite`, `POST /api/snippets/{id}/restore`
 * - `DELETE /api/snippets/{id}/permanent`
 * - `GET|DELETE /api/archive`
 * - `GET /api/stats`
 *
 * Every mutation invalidates the owner's cached listings and publishes a
 * `snippet` event on the owner's realtime channel.
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::db::{self, NewSnippet};
use crate::backend::cache::keys;
use crate::backend::error::BackendError;
use crate::backend::folders::db::owns_folder;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::validation::{
    normalize_tags, validate_code, validate_description, validate_language, validate_pagination, validate_title,
};
use crate::shared::{
    ChangeAction, CreateSnippetRequest, EventType, ListSnippetsResponse, RealtimeEvent, SharedError, Snippet,
    SnippetQuery, SnippetStats, UpdateSnippetRequest,
};

/// Response of `DELETE /api/archive`
#[derive(Debug, Serialize)]
pub struct EmptyArchiveResponse {
    pub removed: u64,
}

/// Validate a create request into storable fields
pub fn new_snippet_from_request(request: &CreateSnippetRequest) -> Result<NewSnippet, SharedError> {
    let title = validate_title(&request.title)?;
    let description = validate_description(request.description.as_deref())?;
    validate_code(&request.code)?;
    let language = validate_language(request.language.as_deref().unwrap_or("plaintext"))?;
    let tags = normalize_tags(&request.tags)?;

    Ok(NewSnippet {
        title,
        description,
        code: request.code.clone(),
        language,
        tags,
        folder_id: request.folder_id,
        is_favorite: request.is_favorite,
        is_public: request.is_public,
    })
}

/// Apply a partial update to `snippet`
pub fn apply_update(snippet: &mut Snippet, request: &UpdateSnippetRequest) -> Result<(), SharedError> {
    if let Some(title) = &request.title {
        snippet.title = validate_title(title)?;
    }
    if let Some(description) = &request.description {
        snippet.description = validate_description(description.as_deref())?;
    }
    if let Some(code) = &request.code {
        validate_code(code)?;
        snippet.code = code.clone();
    }
    if let Some(language) = &request.language {
        snippet.language = validate_language(language)?;
    }
    if let Some(tags) = &request.tags {
        snippet.tags = normalize_tags(tags)?;
    }
    if let Some(folder_id) = request.folder_id {
        snippet.folder_id = folder_id;
    }
    if let Some(is_public) = request.is_public {
        snippet.is_public = is_public;
    }
    Ok(())
}

/// Invalidate the owner's cached views and push the change
pub(crate) fn snippet_changed(state: &AppState, owner_id: Uuid, action: ChangeAction, payload: serde_json::Value) {
    state.cache.invalidate_pattern(&keys::snippets_of(owner_id));
    state.cache.invalidate(&keys::folders(owner_id));
    state.cache.invalidate(&keys::stats(owner_id));
    state.cache.invalidate(keys::ADMIN_STATS);

    let delivered = state
        .realtime
        .publish(owner_id, RealtimeEvent::change(EventType::Snippet, action, payload));
    tracing::debug!("Snippet {:?} event delivered to {} subscribers", action, delivered);
}

async fn ensure_folder(state: &AppState, owner_id: Uuid, folder_id: Option<Uuid>) -> Result<(), BackendError> {
    if let Some(folder_id) = folder_id {
        if !owns_folder(&state.db, owner_id, folder_id).await? {
            return Err(BackendError::not_found("Folder not found"));
        }
    }
    Ok(())
}

/// Create and announce a snippet for `owner_id`
pub(crate) async fn create_for(
    state: &AppState,
    owner_id: Uuid,
    request: &CreateSnippetRequest,
) -> Result<Snippet, BackendError> {
    let new = new_snippet_from_request(request)?;
    ensure_folder(state, owner_id, new.folder_id).await?;

    let snippet = db::create_snippet(&state.db, owner_id, new).await?;
    snippet_changed(state, owner_id, ChangeAction::Created, serde_json::to_value(&snippet)?);
    Ok(snippet)
}

/// Cached, paginated listing of `owner_id`'s live snippets
pub(crate) async fn list_for(
    state: &AppState,
    owner_id: Uuid,
    query: &SnippetQuery,
) -> Result<ListSnippetsResponse, BackendError> {
    let (limit, offset) = validate_pagination(query.limit, query.offset)?;

    let key = keys::snippet_list(owner_id, query);
    if let Some(cached) = state.cache.get::<ListSnippetsResponse>(&key) {
        tracing::debug!("Snippet list cache hit for {}", owner_id);
        return Ok(cached);
    }

    let (snippets, total) = db::list_snippets(&state.db, owner_id, query, limit, offset).await?;
    let response = ListSnippetsResponse {
        has_more: offset + (snippets.len() as i64) < total,
        snippets,
        total,
    };
    state.cache.set(key, &response);
    Ok(response)
}

pub async fn create_snippet(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateSnippetRequest>,
) -> Result<(StatusCode, Json<Snippet>), BackendError> {
    let snippet = create_for(&state, user.id, &request).await?;
    tracing::info!("Snippet {} created by {}", snippet.id, user.username);
    Ok((StatusCode::CREATED, Json(snippet)))
}

pub async fn list_snippets(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<SnippetQuery>,
) -> Result<Json<ListSnippetsResponse>, BackendError> {
    Ok(Json(list_for(&state, user.id, &query).await?))
}

pub async fn get_snippet(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Snippet>, BackendError> {
    let snippet = db::get_visible_snippet(&state.db, user.id, id)
        .await?
        .ok_or_else(|| BackendError::not_found("Snippet not found"))?;
    Ok(Json(snippet))
}

pub async fn update_snippet(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSnippetRequest>,
) -> Result<Json<Snippet>, BackendError> {
    let mut snippet = db::get_owned_snippet(&state.db, user.id, id)
        .await?
        .ok_or_else(|| BackendError::not_found("Snippet not found"))?;
    if snippet.is_archived() {
        return Err(BackendError::conflict("Archived snippets cannot be edited; restore it first"));
    }

    apply_update(&mut snippet, &request)?;
    if let Some(Some(folder_id)) = request.folder_id {
        ensure_folder(&state, user.id, Some(folder_id)).await?;
    }

    let snippet = db::save_snippet(&state.db, &snippet).await?;
    snippet_changed(&state, user.id, ChangeAction::Updated, serde_json::to_value(&snippet)?);
    Ok(Json(snippet))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Snippet>, BackendError> {
    let snippet = db::toggle_favorite(&state.db, user.id, id)
        .await?
        .ok_or_else(|| BackendError::not_found("Snippet not found"))?;
    snippet_changed(&state, user.id, ChangeAction::Updated, serde_json::to_value(&snippet)?);
    Ok(Json(snippet))
}

/// Soft delete: move the snippet to the archive
pub async fn delete_snippet(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Snippet>, BackendError> {
    let Some(snippet) = db::archive_snippet(&state.db, user.id, id).await? else {
        return match db::get_owned_snippet(&state.db, user.id, id).await? {
            Some(_) => Err(BackendError::conflict("Snippet is already archived")),
            None => Err(BackendError::not_found("Snippet not found")),
        };
    };

    tracing::info!("Snippet {} archived by {}", id, user.username);
    snippet_changed(&state, user.id, ChangeAction::Archived, serde_json::to_value(&snippet)?);
    Ok(Json(snippet))
}

pub async fn restore_snippet(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Snippet>, BackendError> {
    let Some(snippet) = db::restore_snippet(&state.db, user.id, id).await? else {
        return match db::get_owned_snippet(&state.db, user.id, id).await? {
            Some(_) => Err(BackendError::conflict("Snippet is not archived")),
            None => Err(BackendError::not_found("Snippet not found")),
        };
    };

    snippet_changed(&state, user.id, ChangeAction::Restored, serde_json::to_value(&snippet)?);
    Ok(Json(snippet))
}

pub async fn delete_snippet_permanently(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    if !db::delete_archived_snippet(&state.db, user.id, id).await? {
        return match db::get_owned_snippet(&state.db, user.id, id).await? {
            Some(_) => Err(BackendError::conflict("Only archived snippets can be deleted permanently")),
            None => Err(BackendError::not_found("Snippet not found")),
        };
    }

    tracing::info!("Snippet {} permanently deleted by {}", id, user.username);
    snippet_changed(&state, user.id, ChangeAction::Deleted, serde_json::json!({ "id": id }));
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_archive(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Snippet>>, BackendError> {
    Ok(Json(db::list_archived(&state.db, user.id).await?))
}

pub async fn empty_archive(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<EmptyArchiveResponse>, BackendError> {
    let removed = db::empty_archive(&state.db, user.id).await?;
    if removed > 0 {
        snippet_changed(&state, user.id, ChangeAction::Deleted, serde_json::json!({ "removed": removed }));
        state
            .audit
            .record(
                Some(user.id),
                crate::backend::audit::ARCHIVE_EMPTIED,
                None,
                serde_json::json!({ "removed": removed }),
            )
            .await;
    }
    Ok(Json(EmptyArchiveResponse { removed }))
}

pub async fn get_stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<SnippetStats>, BackendError> {
    let key = keys::stats(user.id);
    if let Some(stats) = state.cache.get::<SnippetStats>(&key) {
        return Ok(Json(stats));
    }
    let stats = db::snippet_stats(&state.db, user.id).await?;
    state.cache.set(key, &stats);
    Ok(Json(stats))
}
