//! Admin panel integration tests

#![cfg(feature = "ssr")]

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use codepocket::backend::server::ServerConfig;
use common::{TestApp, TestUser};

async fn app_with_admin() -> (TestApp, TestUser) {
    let config = ServerConfig {
        admin_emails: vec!["root@example.com".to_string()],
        ..ServerConfig::ephemeral()
    };
    let app = TestApp::with_config(config).await;
    let root = app.signup("root").await;
    (app, root)
}

#[tokio::test]
async fn test_admin_email_gets_admin_role() {
    let (app, root) = app_with_admin().await;
    let me = app.get("/api/auth/me", &root.token).await;
    assert_eq!(me.body["role"], "admin");
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let (app, _root) = app_with_admin().await;
    let alice = app.signup("alice").await;

    for uri in ["/api/admin/stats", "/api/admin/users", "/api/admin/events"] {
        let response = app.get(uri, &alice.token).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[tokio::test]
async fn test_stats_follow_changes() {
    let (app, root) = app_with_admin().await;
    let alice = app.signup("alice").await;

    let before = app.get("/api/admin/stats", &root.token).await;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.body["users"], 2);
    assert_eq!(before.body["admins"], 1);
    assert_eq!(before.body["snippets"], 0);

    app.create_snippet(&alice, json!({"title": "t", "code": "x"})).await;
    app.post("/api/groups", &alice.token, json!({"name": "Team"})).await;

    let after = app.get("/api/admin/stats", &root.token).await;
    assert_eq!(after.body["snippets"], 1);
    assert_eq!(after.body["groups"], 1);
}

#[tokio::test]
async fn test_search_users() {
    let (app, root) = app_with_admin().await;
    app.signup("alice").await;
    app.signup("albert").await;
    app.signup("bob").await;

    let all = app.get("/api/admin/users", &root.token).await;
    assert_eq!(all.body.as_array().unwrap().len(), 4);

    let found = app.get("/api/admin/users?q=al", &root.token).await;
    assert_eq!(found.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_disable_user_blocks_sessions() {
    let (app, root) = app_with_admin().await;
    let alice = app.signup("alice").await;

    let updated = app
        .patch(&format!("/api/admin/users/{}", alice.id), &root.token, json!({"is_disabled": true}))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["is_disabled"], true);

    let me = app.get("/api/auth/me", &alice.token).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let events = app.get("/api/admin/events?action=admin.user_updated", &root.token).await;
    assert_eq!(events.body.as_array().unwrap().len(), 1);
    assert_eq!(events.body[0]["target"], "alice");
}

#[tokio::test]
async fn test_admin_cannot_lock_themselves_out() {
    let (app, root) = app_with_admin().await;
    let uri = format!("/api/admin/users/{}", root.id);

    let demote = app.patch(&uri, &root.token, json!({"role": "user"})).await;
    assert_eq!(demote.status, StatusCode::CONFLICT);

    let delete = app.delete(&uri, &root.token).await;
    assert_eq!(delete.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_promote_and_delete_user() {
    let (app, root) = app_with_admin().await;
    let alice = app.signup("alice").await;
    let uri = format!("/api/admin/users/{}", alice.id);

    let promoted = app.patch(&uri, &root.token, json!({"role": "admin"})).await;
    assert_eq!(promoted.body["role"], "admin");
    assert_eq!(app.get("/api/admin/stats", &alice.token).await.status, StatusCode::OK);

    let deleted = app.delete(&uri, &root.token).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&uri, &root.token).await.status, StatusCode::NOT_FOUND);

    let missing = app
        .patch(&uri, &root.token, json!({"is_disabled": false}))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
