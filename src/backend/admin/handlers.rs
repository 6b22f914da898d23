/**
 * Admin Handlers
 *
 * All routes take the `AdminUser` extractor (403 for everyone else):
 *
 * - `GET /api/admin/stats`
 * - `GET /api/admin/users?q&limit&offset`
 * - `PATCH /api/admin/users/{id}` - role and disabled flag
 * - `DELETE /api/admin/users/{id}`
 * - `GET /api/admin/events?action&limit&offset`
 *
 * Admins cannot demote, disable or delete themselves.
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use super::db;
use crate::backend::audit;
use crate::backend::auth::users;
use crate::backend::cache::keys;
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AdminUser;
use crate::backend::server::state::AppState;
use crate::shared::validation::validate_pagination;
use crate::shared::{AdminStats, AdminUserQuery, AdminUserUpdate, AuditEvent, AuditQuery, User, UserRole};

pub async fn get_stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<AdminStats>, BackendError> {
    if let Some(stats) = state.cache.get::<AdminStats>(keys::ADMIN_STATS) {
        return Ok(Json(stats));
    }
    let stats = db::admin_stats(&state.db).await?;
    state.cache.set(keys::ADMIN_STATS, &stats);
    Ok(Json(stats))
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<AdminUserQuery>,
) -> Result<Json<Vec<User>>, BackendError> {
    let (limit, offset) = validate_pagination(query.limit, query.offset)?;
    Ok(Json(db::list_users(&state.db, query.q.as_deref(), limit, offset).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(update): Json<AdminUserUpdate>,
) -> Result<Json<User>, BackendError> {
    if id == admin.id && (update.role == Some(UserRole::User) || update.is_disabled == Some(true)) {
        return Err(BackendError::conflict("Admins cannot demote or disable themselves"));
    }

    let record = users::update_account_flags(&state.db, id, update.role, update.is_disabled).await?;
    state.cache.invalidate(keys::ADMIN_STATS);
    state
        .audit
        .record(
            Some(admin.id),
            audit::ADMIN_USER_UPDATED,
            Some(record.username.clone()),
            serde_json::json!({ "role": update.role, "is_disabled": update.is_disabled }),
        )
        .await;

    tracing::info!("Admin {} updated account {}", admin.username, record.username);
    Ok(Json(record.to_user()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    if id == admin.id {
        return Err(BackendError::conflict("Admins cannot delete themselves"));
    }
    let record = users::get_user_by_id(&state.db, id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;
    users::delete_user(&state.db, id).await?;

    state.cache.invalidate_pattern(&keys::snippets_of(id));
    state.cache.invalidate(&keys::folders(id));
    state.cache.invalidate(&keys::stats(id));
    state.cache.invalidate(keys::ADMIN_STATS);
    state
        .audit
        .record(
            Some(admin.id),
            audit::ADMIN_USER_DELETED,
            Some(record.username.clone()),
            serde_json::json!({ "user_id": id }),
        )
        .await;

    tracing::warn!("Admin {} deleted account {}", admin.username, record.username);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_events(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEvent>>, BackendError> {
    let (limit, offset) = validate_pagination(query.limit, query.offset)?;
    let action = query.action.as_deref().map(str::trim).filter(|a| !a.is_empty());
    Ok(Json(state.audit.list_events(limit, offset, action).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::create_user;
    use crate::backend::server::config::ServerConfig;
    use crate::backend::server::init::build_state;

    async fn setup() -> (AppState, AdminUser, User) {
        let state = build_state(ServerConfig::ephemeral()).await.unwrap();
        let admin = create_user(&state.db, "root", "root@example.com", "h", UserRole::Admin)
            .await
            .unwrap();
        let user = create_user(&state.db, "carl", "carl@example.com", "h", UserRole::User)
            .await
            .unwrap();
        (state, AdminUser(admin.to_user()), user.to_user())
    }

    #[tokio::test]
    async fn test_self_protection() {
        let (state, admin, _) = setup().await;
        let id = admin.0.id;

        let demote = AdminUserUpdate {
            role: Some(UserRole::User),
            is_disabled: None,
        };
        let err = update_user(State(state.clone()), admin.clone(), Path(id), Json(demote))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = delete_user(State(state), admin, Path(id)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_disable_user_is_audited_and_refreshes_stats() {
        let (state, admin, user) = setup().await;
        let Json(before) = get_stats(State(state.clone()), admin.clone()).await.unwrap();
        assert_eq!(before.disabled_users, 0);

        let disable = AdminUserUpdate {
            role: None,
            is_disabled: Some(true),
        };
        let Json(updated) = update_user(State(state.clone()), admin.clone(), Path(user.id), Json(disable))
            .await
            .unwrap();
        assert!(updated.is_disabled);

        let Json(after) = get_stats(State(state.clone()), admin.clone()).await.unwrap();
        assert_eq!(after.disabled_users, 1);

        let query = AuditQuery {
            action: Some(audit::ADMIN_USER_UPDATED.to_string()),
            ..Default::default()
        };
        let Json(events) = list_events(State(state), admin, Query(query)).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target.as_deref(), Some("carl"));
    }

    #[tokio::test]
    async fn test_delete_and_unknown_user() {
        let (state, admin, user) = setup().await;
        delete_user(State(state.clone()), admin.clone(), Path(user.id)).await.unwrap();

        let err = delete_user(State(state.clone()), admin.clone(), Path(user.id)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = update_user(State(state), admin, Path(user.id), Json(AdminUserUpdate::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
