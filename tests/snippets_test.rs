//! Snippet and folder API integration tests

#![cfg(feature = "ssr")]

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{id_of, TestApp};

#[tokio::test]
async fn test_create_normalizes_fields() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;

    let snippet = app
        .create_snippet(
            &alice,
            json!({
                "title": "  Retry   with backoff ",
                "code": "fn retry() {}\n",
                "language": "RS",
                "tags": ["Async", "async", " retry "],
            }),
        )
        .await;

    assert_eq!(snippet["title"], "Retry with backoff");
    assert_eq!(snippet["language"], "rust");
    assert_eq!(snippet["tags"], json!(["async", "retry"]));
    assert_eq!(snippet["code"], "fn retry() {}\n");
    assert_eq!(snippet["is_favorite"], false);
    assert!(snippet["deleted_at"].is_null());
}

#[tokio::test]
async fn test_create_rejects_invalid_snippets() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;

    for body in [
        json!({"title": "", "code": "x"}),
        json!({"title": "t", "code": "   "}),
        json!({"title": "t", "code": "x", "language": "klingon"}),
    ] {
        let response = app.post("/api/snippets", &alice.token, body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{:?}", response.body);
    }
}

#[tokio::test]
async fn test_list_filters_and_search() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;

    app.create_snippet(&alice, json!({"title": "Rust retry", "code": "loop {}", "language": "rust", "tags": ["net"]}))
        .await;
    app.create_snippet(&alice, json!({"title": "Python retry", "code": "while True: pass", "language": "python"}))
        .await;
    app.create_snippet(
        &alice,
        json!({"title": "Rust parse", "code": "s.parse()", "language": "rust", "is_favorite": true}),
    )
    .await;

    let all = app.get("/api/snippets", &alice.token).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body["total"], 3);

    let rust = app.get("/api/snippets?language=rs", &alice.token).await;
    assert_eq!(rust.body["total"], 2);

    let tagged = app.get("/api/snippets?tag=net", &alice.token).await;
    assert_eq!(tagged.body["total"], 1);

    let favorites = app.get("/api/snippets?favorite=true", &alice.token).await;
    assert_eq!(favorites.body["snippets"][0]["title"], "Rust parse");

    let search = app.get("/api/snippets?q=RETRY", &alice.token).await;
    assert_eq!(search.body["total"], 2);

    let by_code = app.get("/api/snippets?q=parse()", &alice.token).await;
    assert_eq!(by_code.body["total"], 1);

    let sorted = app.get("/api/snippets?sort=title", &alice.token).await;
    let titles: Vec<&str> = sorted.body["snippets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Python retry", "Rust parse", "Rust retry"]);
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    app.create_snippet(&alice, json!({"title": "Progress", "code": "println!(\"100%\")"})).await;
    app.create_snippet(&alice, json!({"title": "Other", "code": "let x = 1;"})).await;

    let percent = app.get("/api/snippets?q=%25", &alice.token).await;
    assert_eq!(percent.body["total"], 1);
}

#[tokio::test]
async fn test_pagination() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    for i in 0..5 {
        app.create_snippet(&alice, json!({"title": format!("snippet {}", i), "code": "x"})).await;
    }

    let first = app.get("/api/snippets?limit=2", &alice.token).await;
    assert_eq!(first.body["snippets"].as_array().unwrap().len(), 2);
    assert_eq!(first.body["total"], 5);
    assert_eq!(first.body["has_more"], true);

    let last = app.get("/api/snippets?limit=2&offset=4", &alice.token).await;
    assert_eq!(last.body["snippets"].as_array().unwrap().len(), 1);
    assert_eq!(last.body["has_more"], false);

    let invalid = app.get("/api/snippets?limit=0", &alice.token).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_is_visible_through_cached_list() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let snippet = app.create_snippet(&alice, json!({"title": "Before", "code": "x"})).await;

    let listed = app.get("/api/snippets", &alice.token).await;
    assert_eq!(listed.body["snippets"][0]["title"], "Before");

    let updated = app
        .patch(
            &format!("/api/snippets/{}", id_of(&snippet)),
            &alice.token,
            json!({"title": "After", "description": null}),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "After");

    let listed = app.get("/api/snippets", &alice.token).await;
    assert_eq!(listed.body["snippets"][0]["title"], "After");
}

#[tokio::test]
async fn test_private_snippets_are_hidden_from_others() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    let private = app.create_snippet(&alice, json!({"title": "Secret", "code": "x"})).await;
    let public = app
        .create_snippet(&alice, json!({"title": "Open", "code": "x", "is_public": true}))
        .await;

    let hidden = app.get(&format!("/api/snippets/{}", id_of(&private)), &bob.token).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let visible = app.get(&format!("/api/snippets/{}", id_of(&public)), &bob.token).await;
    assert_eq!(visible.status, StatusCode::OK);

    let edit = app
        .patch(&format!("/api/snippets/{}", id_of(&public)), &bob.token, json!({"title": "Mine"}))
        .await;
    assert_eq!(edit.status, StatusCode::NOT_FOUND);

    let bobs_list = app.get("/api/snippets", &bob.token).await;
    assert_eq!(bobs_list.body["total"], 0);
}

#[tokio::test]
async fn test_favorite_toggle() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let snippet = app.create_snippet(&alice, json!({"title": "Fav", "code": "x"})).await;
    let uri = format!("/api/snippets/{}/favorite", id_of(&snippet));

    let on = app.post(&uri, &alice.token, json!({})).await;
    assert_eq!(on.body["is_favorite"], true);
    let off = app.post(&uri, &alice.token, json!({})).await;
    assert_eq!(off.body["is_favorite"], false);
}

#[tokio::test]
async fn test_archive_lifecycle() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let snippet = app.create_snippet(&alice, json!({"title": "Old", "code": "x"})).await;
    let id = id_of(&snippet);

    let archived = app.delete(&format!("/api/snippets/{}", id), &alice.token).await;
    assert_eq!(archived.status, StatusCode::OK);
    assert!(archived.body["deleted_at"].is_string());

    let again = app.delete(&format!("/api/snippets/{}", id), &alice.token).await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let listed = app.get("/api/snippets", &alice.token).await;
    assert_eq!(listed.body["total"], 0);
    let archive = app.get("/api/archive", &alice.token).await;
    assert_eq!(archive.body.as_array().unwrap().len(), 1);

    let edit = app
        .patch(&format!("/api/snippets/{}", id), &alice.token, json!({"title": "New"}))
        .await;
    assert_eq!(edit.status, StatusCode::CONFLICT);

    let restored = app
        .post(&format!("/api/snippets/{}/restore", id), &alice.token, json!({}))
        .await;
    assert_eq!(restored.status, StatusCode::OK);
    assert!(restored.body["deleted_at"].is_null());

    let not_archived = app
        .post(&format!("/api/snippets/{}/restore", id), &alice.token, json!({}))
        .await;
    assert_eq!(not_archived.status, StatusCode::CONFLICT);

    let live_delete = app.delete(&format!("/api/snippets/{}/permanent", id), &alice.token).await;
    assert_eq!(live_delete.status, StatusCode::CONFLICT);

    app.delete(&format!("/api/snippets/{}", id), &alice.token).await;
    let gone = app.delete(&format!("/api/snippets/{}/permanent", id), &alice.token).await;
    assert_eq!(gone.status, StatusCode::NO_CONTENT);

    let missing = app.get(&format!("/api/snippets/{}", id), &alice.token).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_archive() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    for title in ["a", "b"] {
        let snippet = app.create_snippet(&alice, json!({"title": title, "code": "x"})).await;
        app.delete(&format!("/api/snippets/{}", id_of(&snippet)), &alice.token).await;
    }
    app.create_snippet(&alice, json!({"title": "kept", "code": "x"})).await;

    let emptied = app.delete("/api/archive", &alice.token).await;
    assert_eq!(emptied.status, StatusCode::OK);
    assert_eq!(emptied.body["removed"], 2);

    let listed = app.get("/api/snippets", &alice.token).await;
    assert_eq!(listed.body["total"], 1);
}

#[tokio::test]
async fn test_stats() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    app.create_snippet(&alice, json!({"title": "a", "code": "x", "language": "rust", "is_favorite": true}))
        .await;
    app.create_snippet(&alice, json!({"title": "b", "code": "x", "language": "rust"})).await;
    let archived = app.create_snippet(&alice, json!({"title": "c", "code": "x", "language": "go"})).await;
    app.delete(&format!("/api/snippets/{}", id_of(&archived)), &alice.token).await;

    let stats = app.get("/api/stats", &alice.token).await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.body["total"], 2);
    assert_eq!(stats.body["favorites"], 1);
    assert_eq!(stats.body["archived"], 1);
    assert_eq!(stats.body["by_language"]["rust"], 2);
}

#[tokio::test]
async fn test_folders() {
    let app = TestApp::new().await;
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;

    let created = app.post("/api/folders", &alice.token, json!({"name": "Snippets"})).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let folder_id = id_of(&created.body);

    let duplicate = app.post("/api/folders", &alice.token, json!({"name": "Snippets"})).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let filed = app
        .create_snippet(&alice, json!({"title": "In folder", "code": "x", "folder_id": folder_id}))
        .await;
    assert_eq!(filed["folder_id"], folder_id.as_str());

    let foreign = app
        .post("/api/snippets", &bob.token, json!({"title": "t", "code": "x", "folder_id": folder_id}))
        .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let folders = app.get("/api/folders", &alice.token).await;
    assert_eq!(folders.body[0]["snippet_count"], 1);

    let in_folder = app.get(&format!("/api/snippets?folder_id={}", folder_id), &alice.token).await;
    assert_eq!(in_folder.body["total"], 1);

    let renamed = app
        .patch(&format!("/api/folders/{}", folder_id), &alice.token, json!({"name": "Renamed"}))
        .await;
    assert_eq!(renamed.body["name"], "Renamed");

    let deleted = app.delete(&format!("/api/folders/{}", folder_id), &alice.token).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let snippet = app.get(&format!("/api/snippets/{}", id_of(&filed)), &alice.token).await;
    assert!(snippet.body["folder_id"].is_null());
}
