//! Router-level tests: health, fallback and realtime delivery

#![cfg(feature = "ssr")]

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use codepocket::backend::routes::create_router;
use codepocket::shared::{ChangeAction, EventType};
use common::{id_of, TestApp};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.send(Method::GET, "/health", &[], None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new().await;
    let response = app.send(Method::GET, "/api/nothing-here", &[], None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({"error": "Route not found", "status": 404}));
}

#[tokio::test]
async fn test_realtime_endpoint_streams_events() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;

    let request = Request::builder()
        .uri(format!("/api/realtime?types=snippet&access_token={}", alice.token))
        .body(Body::empty())
        .unwrap();
    let response = create_router(app.state.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let unauthenticated = Request::builder().uri("/api/realtime").body(Body::empty()).unwrap();
    let response = create_router(app.state.clone()).oneshot(unauthenticated).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_snippet_changes_reach_only_the_owner() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    let alice_id: Uuid = alice.id.parse().unwrap();
    let bob_id: Uuid = bob.id.parse().unwrap();

    let mut alice_rx = app.state.realtime.subscribe(alice_id);
    let mut bob_rx = app.state.realtime.subscribe(bob_id);

    let snippet = app.create_snippet(&alice, json!({"title": "Live", "code": "x"})).await;

    let event = alice_rx.try_recv().unwrap();
    assert_eq!(event.event_type, EventType::Snippet);
    assert_eq!(event.action, Some(ChangeAction::Created));
    assert_eq!(event.payload["id"], id_of(&snippet).as_str());
    assert!(bob_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_invitation_is_pushed_to_invitee() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    let mut bob_rx = app.state.realtime.subscribe(bob.id.parse().unwrap());

    let group = app.post("/api/groups", &alice.token, json!({"name": "Team"})).await;
    app.post(
        &format!("/api/groups/{}/invitations", id_of(&group.body)),
        &alice.token,
        json!({"username": "bob"}),
    )
    .await;

    let event = bob_rx.try_recv().unwrap();
    assert_eq!(event.event_type, EventType::Invitation);
}
