//! Common test utilities for API integration tests
//!
//! Every context builds the full router over a fresh `MemoryStore` and a
//! recording mailer, so tests need neither a database nor network access.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tasksmash_api::app::{build_router, AppState};
use tasksmash_api::config::Config;
use tasksmash_shared::mail::RecordingMailer;
use tasksmash_shared::store::MemoryStore;
use tower::Service as _;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing the router and its collaborators
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub config: Config,
}

/// A registered account with its session token
pub struct TestAccount {
    pub id: i64,
    pub username: String,
    pub token: String,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_mailer(Arc::new(RecordingMailer::new()))
    }

    pub fn with_mailer(mailer: Arc<RecordingMailer>) -> Self {
        let config = Config::for_testing(SECRET);
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), mailer.clone(), config.clone());

        TestContext {
            app: build_router(state),
            store,
            mailer,
            config,
        }
    }

    /// Sends a request and returns status and JSON body (`Null` when empty)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Registers `username` with `username@example.com` and password "pw123"
    pub async fn register(&self, username: &str) -> TestAccount {
        let (status, body) = self
            .send(
                Method::POST,
                "/v1/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "pw123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        TestAccount {
            id: body["account"]["id"].as_i64().unwrap(),
            username: username.to_string(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a task and returns its id
    pub async fn create_task(&self, account: &TestAccount, content: &str) -> i64 {
        let (status, body) = self
            .post("/v1/tasks", &account.token, json!({ "content": content }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create task failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    /// Posts a comment (or reply) and returns its id
    pub async fn comment(&self, account: &TestAccount, task_id: i64, content: &str, parent_id: Option<i64>) -> i64 {
        let (status, body) = self
            .post(
                &format!("/v1/tasks/{}/comments", task_id),
                &account.token,
                json!({ "content": content, "parent_id": parent_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "comment failed: {}", body);
        body["id"].as_i64().unwrap()
    }
}
