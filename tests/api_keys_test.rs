//! API key management and external API integration tests

#![cfg(feature = "ssr")]

mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use codepocket::backend::server::config::RateLimitConfig;
use codepocket::backend::server::ServerConfig;
use common::{id_of, TestApp, TestUser};

async fn issue_key(app: &TestApp, user: &TestUser, name: &str) -> Value {
    let response = app.post("/api/keys", &user.token, json!({"name": name})).await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body
}

#[tokio::test]
async fn test_key_is_shown_once() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;

    let created = issue_key(&app, &alice, "laptop").await;
    let key = created["key"].as_str().unwrap();
    let prefix = created["prefix"].as_str().unwrap();
    assert!(key.starts_with(&format!("cp_{}_", prefix)));

    let listed = app.get("/api/keys", &alice.token).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
    assert_eq!(listed.body[0]["prefix"], prefix);
    assert!(listed.body[0].get("key").is_none());
    assert!(listed.body[0]["revoked_at"].is_null());
}

#[tokio::test]
async fn test_external_api_with_key() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let key = issue_key(&app, &alice, "editor").await["key"].as_str().unwrap().to_string();
    let headers = [("x-api-key", key.as_str())];

    let created = app
        .send(
            Method::POST,
            "/api/v1/snippets",
            &headers,
            Some(json!({"title": "From editor", "code": "print(1)", "language": "py"})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["language"], "python");

    let found = app.send(Method::GET, "/api/v1/snippets?q=editor", &headers, None).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["total"], 1);
    assert!(found.headers.contains_key("x-ratelimit-remaining"));

    let fetched = app
        .send(Method::GET, &format!("/api/v1/snippets/{}", id_of(&created.body)), &headers, None)
        .await;
    assert_eq!(fetched.body["title"], "From editor");

    // visible to the session API too
    let listed = app.get("/api/snippets", &alice.token).await;
    assert_eq!(listed.body["total"], 1);

    let keys = app.get("/api/keys", &alice.token).await;
    assert!(keys.body[0]["last_used_at"].is_string());
}

#[tokio::test]
async fn test_key_in_bearer_header() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let key = issue_key(&app, &alice, "ci").await["key"].as_str().unwrap().to_string();

    let response = app.request(Method::GET, "/api/v1/snippets", Some(&key), None).await;
    assert_eq!(response.status, StatusCode::OK);

    // keys are not sessions
    let session_route = app.get("/api/snippets", &key).await;
    assert_eq!(session_route.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_external_api_rejects_bad_keys() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;

    let missing = app.send(Method::GET, "/api/v1/snippets", &[], None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let forged = app
        .send(Method::GET, "/api/v1/snippets", &[("x-api-key", "cp_abcdefgh_not-a-real-secret")], None)
        .await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);

    // a session token is not an API key
    let jwt = app
        .request(Method::GET, "/api/v1/snippets", Some(&alice.token), None)
        .await;
    assert_eq!(jwt.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoked_key_stops_working() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let created = issue_key(&app, &alice, "old").await;
    let key = created["key"].as_str().unwrap().to_string();

    let revoked = app.delete(&format!("/api/keys/{}", id_of(&created)), &alice.token).await;
    assert_eq!(revoked.status, StatusCode::NO_CONTENT);

    let again = app.delete(&format!("/api/keys/{}", id_of(&created)), &alice.token).await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let response = app
        .send(Method::GET, "/api/v1/snippets", &[("x-api-key", key.as_str())], None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_keys_are_private_to_owner() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    let created = issue_key(&app, &alice, "mine").await;

    let response = app.delete(&format!("/api/keys/{}", id_of(&created)), &bob.token).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let bobs = app.get("/api/keys", &bob.token).await;
    assert!(bobs.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_external_get_respects_visibility() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    let key = issue_key(&app, &bob, "editor").await["key"].as_str().unwrap().to_string();

    let private = app.create_snippet(&alice, json!({"title": "Private", "code": "x"})).await;
    let public = app
        .create_snippet(&alice, json!({"title": "Public", "code": "x", "is_public": true}))
        .await;
    let headers = [("x-api-key", key.as_str())];

    let hidden = app
        .send(Method::GET, &format!("/api/v1/snippets/{}", id_of(&private)), &headers, None)
        .await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let visible = app
        .send(Method::GET, &format!("/api/v1/snippets/{}", id_of(&public)), &headers, None)
        .await;
    assert_eq!(visible.status, StatusCode::OK);
}

#[tokio::test]
async fn test_external_api_is_rate_limited_per_key() {
    let config = ServerConfig {
        rate_limit: RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 3,
        },
        ..ServerConfig::ephemeral()
    };
    let app = TestApp::with_config(config).await;
    let alice = app.signup("alice").await;
    let first = issue_key(&app, &alice, "one").await["key"].as_str().unwrap().to_string();
    let second = issue_key(&app, &alice, "two").await["key"].as_str().unwrap().to_string();

    for expected in ["2", "1", "0"] {
        let response = app
            .send(Method::GET, "/api/v1/snippets", &[("x-api-key", first.as_str())], None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.headers["x-ratelimit-remaining"], expected);
    }

    let limited = app
        .send(Method::GET, "/api/v1/snippets", &[("x-api-key", first.as_str())], None)
        .await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.headers["x-ratelimit-remaining"], "0");

    let other_key = app
        .send(Method::GET, "/api/v1/snippets", &[("x-api-key", second.as_str())], None)
        .await;
    assert_eq!(other_key.status, StatusCode::OK);
}
