/// Common test utilities for integration tests
///
/// Builds the real router over in-memory stores and a recording notifier,
/// so the HTTP tests need neither PostgreSQL nor Redis.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use tasklist_api::app::{build_router, AppState};
use tasklist_shared::auth::password::HashParams;
use tasklist_shared::notify::{EventPublisher, NotifyPolicy, RecordingNotifier};
use tasklist_shared::services::{IdentityConfig, IdentityService, TaskService};
use tasklist_shared::store::{MemoryAccountStore, MemoryTaskStore};
use tower::Service as _;

pub const SECRET: &str = "api-test-secret-key-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,
    pub accounts: Arc<MemoryAccountStore>,
    pub tasks: Arc<MemoryTaskStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_policy(NotifyPolicy::Strict)
    }

    pub fn with_policy(policy: NotifyPolicy) -> Self {
        let accounts = Arc::new(MemoryAccountStore::new());
        let tasks = Arc::new(MemoryTaskStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let events = EventPublisher::new(notifier.clone(), policy);

        let identity = IdentityService::new(
            accounts.clone(),
            events.clone(),
            IdentityConfig {
                hash_params: HashParams::minimal(),
                ..IdentityConfig::new(SECRET)
            },
        );
        let task_service = TaskService::new(tasks.clone(), events);

        let state = AppState::new(identity, task_service);
        let app = build_router(state.clone(), &["*".to_string()]);

        Self {
            app,
            state,
            accounts,
            tasks,
            notifier,
        }
    }

    /// Sends a request and returns the status with the parsed JSON body
    ///
    /// Non-JSON bodies come back as `Value::Null`.
    pub async fn request(
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

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .call(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    /// Registers an account and signs it in, returning (account id, token)
    pub async fn sign_up_and_in(&self, username: &str, password: &str) -> (i64, String) {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/sign-up",
                None,
                Some(serde_json::json!({
                    "name": "Test User",
                    "username": username,
                    "password": password,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "sign-up failed: {}", body);
        let id = body["id"].as_i64().unwrap();

        let (status, body) = self
            .request(
                Method::POST,
                "/auth/sign-in",
                None,
                Some(serde_json::json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "sign-in failed: {}", body);

        (id, body["token"].as_str().unwrap().to_string())
    }

    /// Creates a task and returns its id
    pub async fn create_item(&self, token: &str, title: &str, description: &str) -> i64 {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/items",
                Some(token),
                Some(serde_json::json!({ "title": title, "description": description })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", body);
        body["item_id"].as_i64().unwrap()
    }
}
