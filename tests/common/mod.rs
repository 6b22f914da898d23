//! Common test utilities and helpers
//!
//! Every test builds its own in-memory application and drives the full
//! router with `tower::ServiceExt::oneshot`, so tests never share state.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use codepocket::backend::routes::create_router;
use codepocket::backend::server::{build_state, AppState, ServerConfig};

pub const PASSWORD: &str = "password123";

/// A decoded response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// A signed-up user and their session token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub token: String,
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(ServerConfig::ephemeral()).await
    }

    pub async fn with_config(config: ServerConfig) -> Self {
        let state = build_state(config).await.expect("failed to build test state");
        let router = create_router(state.clone());
        Self { state, router }
    }

    /// Send a request with arbitrary extra headers
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let response = self.router.clone().oneshot(request).await.expect("router error");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, headers, body }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        match token {
            Some(token) => {
                let bearer = format!("Bearer {}", token);
                self.send(method, uri, &[("authorization", bearer.as_str())], body).await
            }
            None => self.send(method, uri, &[], body).await,
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Sign up `<username>@example.com` with the shared test password
    pub async fn signup(&self, username: &str) -> TestUser {
        let response = self
            .request(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "signup failed: {:?}", response.body);

        TestUser {
            id: response.body["user"]["id"].as_str().unwrap().to_string(),
            username: username.to_string(),
            token: response.body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Create a snippet and return its body
    pub async fn create_snippet(&self, user: &TestUser, body: Value) -> Value {
        let response = self.post("/api/snippets", &user.token, body).await;
        assert_eq!(response.status, StatusCode::CREATED, "create failed: {:?}", response.body);
        response.body
    }
}

/// `id` field of a JSON body
pub fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("body has no id").to_string()
}
