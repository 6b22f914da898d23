/**
 * API Route Configuration
 *
 * Session-authenticated routes under `/api`. Each handler declares the
 * caller it accepts through its extractor (`AuthUser`, `AdminUser`), so the
 * routes themselves carry no auth middleware.
 */

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::backend::admin;
use crate::backend::api_keys;
use crate::backend::auth::handlers::{change_password, delete_account, get_me, update_profile};
use crate::backend::folders;
use crate::backend::groups::handlers as groups;
use crate::backend::realtime::handle_realtime_subscription;
use crate::backend::server::state::AppState;
use crate::backend::snippets;

/// Profile, snippets, archive and folders
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/auth/me", get(get_me))
        .route("/api/profile", patch(update_profile).delete(delete_account))
        .route("/api/profile/password", post(change_password))
        .route("/api/snippets", get(snippets::list_snippets).post(snippets::create_snippet))
        .route(
            "/api/snippets/{id}",
            get(snippets::get_snippet)
                .patch(snippets::update_snippet)
                .delete(snippets::delete_snippet),
        )
        .route("/api/snippets/{id}/favorite", post(snippets::toggle_favorite))
        .route("/api/snippets/{id}/restore", post(snippets::restore_snippet))
        .route("/api/snippets/{id}/permanent", delete(snippets::delete_snippet_permanently))
        .route("/api/archive", get(snippets::list_archive).delete(snippets::empty_archive))
        .route("/api/stats", get(snippets::get_stats))
        .route("/api/folders", get(folders::list_folders).post(folders::create_folder))
        .route(
            "/api/folders/{id}",
            patch(folders::rename_folder).delete(folders::delete_folder),
        )
        .route("/api/keys", get(api_keys::list_api_keys).post(api_keys::create_api_key))
        .route("/api/keys/{id}", delete(api_keys::revoke_api_key))
        .route("/api/realtime", get(handle_realtime_subscription))
}

/// Groups, members, invitations, sharing and activity
pub fn configure_group_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/groups", get(groups::list_groups).post(groups::create_group))
        .route(
            "/api/groups/{id}",
            get(groups::get_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
        .route("/api/groups/{id}/members", get(groups::list_members))
        .route(
            "/api/groups/{id}/members/{user_id}",
            patch(groups::update_member_role).delete(groups::remove_member),
        )
        .route(
            "/api/groups/{id}/invitations",
            get(groups::list_group_invitations).post(groups::invite_member),
        )
        .route(
            "/api/groups/{id}/invitations/{invitation_id}",
            delete(groups::revoke_invitation),
        )
        .route(
            "/api/groups/{id}/snippets",
            get(groups::list_shared_snippets).post(groups::share_snippet),
        )
        .route(
            "/api/groups/{id}/snippets/{snippet_id}",
            delete(groups::unshare_snippet),
        )
        .route("/api/groups/{id}/activity", get(groups::list_activity))
        .route("/api/invitations", get(groups::list_my_invitations))
        .route("/api/invitations/{id}/accept", post(groups::accept_invitation))
        .route("/api/invitations/{id}/decline", post(groups::decline_invitation))
}

/// Admin panel
pub fn configure_admin_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/admin/stats", get(admin::get_stats))
        .route("/api/admin/users", get(admin::list_users))
        .route(
            "/api/admin/users/{id}",
            patch(admin::update_user).delete(admin::delete_user),
        )
        .route("/api/admin/events", get(admin::list_events))
}
