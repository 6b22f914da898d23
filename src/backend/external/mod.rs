//! Editor extension endpoints
//!
//! API-key authenticated mirror of the snippet endpoints the extension
//! needs. Results follow the same owner scoping and visibility rules as
//! the session API.
//!
//! - `GET /api/v1/snippets?q&language&tag&limit&offset`
//! - `POST /api/v1/snippets`
//! - `GET /api/v1/snippets/{id}`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::auth::ApiKeyUser;
use crate::backend::server::state::AppState;
use crate::backend::snippets::{db, handlers};
use crate::shared::{CreateSnippetRequest, ListSnippetsResponse, Snippet, SnippetQuery};

pub async fn list_snippets(
    State(state): State<AppState>,
    caller: ApiKeyUser,
    Query(query): Query<SnippetQuery>,
) -> Result<Json<ListSnippetsResponse>, BackendError> {
    tracing::debug!("External snippet search by {} (key {})", caller.user.username, caller.key_id);
    Ok(Json(handlers::list_for(&state, caller.user.id, &query).await?))
}

pub async fn create_snippet(
    State(state): State<AppState>,
    caller: ApiKeyUser,
    Json(request): Json<CreateSnippetRequest>,
) -> Result<(StatusCode, Json<Snippet>), BackendError> {
    let snippet = handlers::create_for(&state, caller.user.id, &request).await?;
    tracing::info!("Snippet {} created through API key {}", snippet.id, caller.key_id);
    Ok((StatusCode::CREATED, Json(snippet)))
}

pub async fn get_snippet(
    State(state): State<AppState>,
    caller: ApiKeyUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Snippet>, BackendError> {
    let snippet = db::get_visible_snippet(&state.db, caller.user.id, id)
        .await?
        .ok_or_else(|| BackendError::not_found("Snippet not found"))?;
    Ok(Json(snippet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::api_keys::db::{create_key, MAX_ACTIVE_KEYS};
    use crate::backend::auth::users::create_user;
    use crate::backend::server::config::ServerConfig;
    use crate::backend::server::init::build_state;
    use crate::shared::UserRole;

    async fn setup() -> (AppState, ApiKeyUser) {
        let state = build_state(ServerConfig::ephemeral()).await.unwrap();
        let record = create_user(&state.db, "ben", "ben@example.com", "h", UserRole::User)
            .await
            .unwrap();
        let key = create_key(&state.db, record.id, "editor", MAX_ACTIVE_KEYS).await.unwrap().unwrap();
        let caller = ApiKeyUser {
            user: record.to_user(),
            key_id: key.id,
        };
        (state, caller)
    }

    #[tokio::test]
    async fn test_create_then_search() {
        let (state, caller) = setup().await;
        let request = CreateSnippetRequest {
            title: "Debounce".into(),
            code: "function debounce() {}".into(),
            language: Some("js".into()),
            ..Default::default()
        };
        let (status, Json(created)) = create_snippet(State(state.clone()), caller.clone(), Json(request))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let query = SnippetQuery {
            q: Some("debounce".into()),
            ..Default::default()
        };
        let Json(found) = list_snippets(State(state.clone()), caller.clone(), Query(query)).await.unwrap();
        assert_eq!(found.total, 1);

        let Json(fetched) = get_snippet(State(state), caller, Path(created.id)).await.unwrap();
        assert_eq!(fetched.language, "javascript");
    }

    #[tokio::test]
    async fn test_unknown_snippet() {
        let (state, caller) = setup().await;
        let err = get_snippet(State(state), caller, Path(Uuid::new_v4())).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
