/// HTTP tests for the Tasklist API
///
/// Drive the full router (gate, handlers, error mapping) end-to-end:
/// - Sign-up and sign-in
/// - Bearer gate rejections
/// - Task lifecycle and ownership
/// - Notification failure policies

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::{Duration, Utc};
use common::TestContext;
use serde_json::json;
use tasklist_shared::notify::{EventPublisher, NotifyPolicy};
use tasklist_shared::services::{IdentityConfig, IdentityService};
use tower::Service as _;

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();

    let (status, body) = ctx.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    ctx.tasks.set_unavailable(true);
    let (status, body) = ctx.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "disconnected");
}

// Identity

#[tokio::test]
async fn test_sign_up_and_sign_in() {
    let ctx = TestContext::new();

    let (id, token) = ctx.sign_up_and_in("alice", "s3cret").await;

    assert_eq!(ctx.state.identity.resolve_identity(&token).unwrap(), id);
    assert_eq!(ctx.notifier.topics(), vec!["sign_up", "sign_in"]);
}

#[tokio::test]
async fn test_sign_in_wrong_password() {
    let ctx = TestContext::new();
    ctx.sign_up_and_in("alice", "s3cret").await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/auth/sign-in",
            None,
            Some(json!({ "username": "alice", "password": "S3cret" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");

    let (status, unknown) = ctx
        .request(
            Method::POST,
            "/auth/sign-in",
            None,
            Some(json!({ "username": "nobody", "password": "S3cret" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, body);
}

#[tokio::test]
async fn test_duplicate_sign_up() {
    let ctx = TestContext::new();
    ctx.sign_up_and_in("alice", "one").await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/auth/sign-up",
            None,
            Some(json!({ "name": "Alice 2", "username": "alice", "password": "two" })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert_eq!(ctx.accounts.account_count(), 1);
}

#[tokio::test]
async fn test_sign_up_validation() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .request(
            Method::POST,
            "/auth/sign-up",
            None,
            Some(json!({ "name": "Nobody", "username": "", "password": "" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"].as_array().unwrap().len(), 2);

    // Whitespace passes the length rule but not the service
    let (status, body) = ctx
        .request(
            Method::POST,
            "/auth/sign-up",
            None,
            Some(json!({ "username": "   ", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(ctx.accounts.account_count(), 0);
}

// Gate

#[tokio::test]
async fn test_gate_rejects_bad_authorization() {
    let ctx = TestContext::new();
    let (_, token) = ctx.sign_up_and_in("alice", "pw").await;
    ctx.create_item(&token, "secret plans", "").await;
    ctx.notifier.clear();

    let forged = {
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "invalidsignature";
        parts.join(".")
    };

    let headers = [
        None,
        Some("Basic YWxpY2U6cHc=".to_string()),
        Some("Bearer ".to_string()),
        Some("Bearer".to_string()),
        Some(format!("Bearer {} extra", token)),
        Some(format!("bearer {}", token)),
        Some(format!("Bearer {}", forged)),
    ];

    for header in headers {
        let mut builder = Request::builder().method(Method::GET).uri("/api/items");
        if let Some(value) = &header {
            builder = builder.header("authorization", value);
        }

        let response = ctx
            .app
            .clone()
            .call(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "header {:?} should be rejected",
            header
        );
    }

    // The handler never ran, so nothing was read or published
    assert!(ctx.notifier.published().is_empty());
}

#[tokio::test]
async fn test_gate_rejects_expired_token() {
    let ctx = TestContext::new();
    let (id, _) = ctx.sign_up_and_in("alice", "pw").await;

    let stale = ctx
        .state
        .identity
        .issue_token_at(id, Utc::now() - Duration::hours(13))
        .unwrap();

    let (status, body) = ctx.request(Method::GET, "/api/items", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
async fn test_gate_rejects_other_secret() {
    let ctx = TestContext::new();
    let (id, _) = ctx.sign_up_and_in("alice", "pw").await;

    let foreign_identity = IdentityService::new(
        ctx.accounts.clone(),
        EventPublisher::new(ctx.notifier.clone(), NotifyPolicy::Strict),
        IdentityConfig::new("another-secret-that-is-32-bytes-long!"),
    );
    let token = foreign_identity.issue_token_at(id, Utc::now()).unwrap();

    let (status, _) = ctx.request(Method::GET, "/api/items", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// Tasks

#[tokio::test]
async fn test_task_lifecycle() {
    let ctx = TestContext::new();
    let (_, token) = ctx.sign_up_and_in("alice", "pw").await;

    let id = ctx.create_item(&token, "buy milk", "2%").await;

    let (status, task) = ctx
        .request(Method::GET, &format!("/api/items/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task, json!({ "id": id, "title": "buy milk", "description": "2%", "done": false }));

    let (status, body) = ctx
        .request(
            Method::PATCH,
            &format!("/api/items/{}?status=true", id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (_, task) = ctx
        .request(Method::GET, &format!("/api/items/{}", id), Some(&token), None)
        .await;
    assert_eq!(task["done"], true);
    assert_eq!(task["title"], "buy milk");

    let (status, _) = ctx
        .request(
            Method::PUT,
            &format!("/api/items/{}", id),
            Some(&token),
            Some(json!({ "title": "buy oat milk", "description": "", "done": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = ctx.request(Method::GET, "/api/items", Some(&token), None).await;
    assert_eq!(list[0]["title"], "buy oat milk");
    assert_eq!(list[0]["done"], false);

    let (status, _) = ctx
        .request(Method::DELETE, &format!("/api/items/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .request(Method::GET, &format!("/api/items/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(ctx.tasks.raw_task(id).unwrap().is_removed);
}

#[tokio::test]
async fn test_internal_fields_not_serialized() {
    let ctx = TestContext::new();
    let (_, token) = ctx.sign_up_and_in("alice", "pw").await;
    ctx.create_item(&token, "t", "").await;

    let (_, list) = ctx.request(Method::GET, "/api/items", Some(&token), None).await;

    let task = list[0].as_object().unwrap();
    assert!(!task.contains_key("account_id"));
    assert!(!task.contains_key("is_removed"));
}

#[tokio::test]
async fn test_ownership_isolation() {
    let ctx = TestContext::new();
    let (_, alice) = ctx.sign_up_and_in("alice", "pw").await;
    let (_, bob) = ctx.sign_up_and_in("bob", "pw").await;

    let id = ctx.create_item(&alice, "alice only", "").await;

    let (_, list) = ctx.request(Method::GET, "/api/items", Some(&bob), None).await;
    assert_eq!(list, json!([]));

    let uri = format!("/api/items/{}", id);
    let (status, foreign) = ctx.request(Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, absent) = ctx
        .request(Method::GET, "/api/items/999999", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(foreign["error"], absent["error"]);

    let (status, _) = ctx.request(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request(Method::PATCH, &format!("{}?status=true", uri), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let raw = ctx.tasks.raw_task(id).unwrap();
    assert!(!raw.done);
    assert!(!raw.is_removed);
}

#[tokio::test]
async fn test_change_status_accepts_short_forms() {
    let ctx = TestContext::new();
    let (_, token) = ctx.sign_up_and_in("alice", "pw").await;
    let id = ctx.create_item(&token, "t", "").await;

    for (param, done) in [("1", true), ("F", false), ("TRUE", true), ("0", false)] {
        let uri = format!("/api/items/{}?status={}", id, param);
        let (status, _) = ctx.request(Method::PATCH, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ctx.tasks.raw_task(id).unwrap().done, done);
    }
}

#[tokio::test]
async fn test_change_status_requires_boolean() {
    let ctx = TestContext::new();
    let (_, token) = ctx.sign_up_and_in("alice", "pw").await;
    let id = ctx.create_item(&token, "t", "").await;

    for uri in [
        format!("/api/items/{}?status=maybe", id),
        format!("/api/items/{}?status=yes", id),
        format!("/api/items/{}", id),
    ] {
        let (status, body) = ctx.request(Method::PATCH, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
    }
}

#[tokio::test]
async fn test_create_rejects_blank_title() {
    let ctx = TestContext::new();
    let (_, token) = ctx.sign_up_and_in("alice", "pw").await;

    for title in ["", "   "] {
        let (status, _) = ctx
            .request(
                Method::POST,
                "/api/items",
                Some(&token),
                Some(json!({ "title": title, "description": "x" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    assert_eq!(ctx.tasks.row_count(), 0);
}

#[tokio::test]
async fn test_bulk_create_partial_commit() {
    let ctx = TestContext::new();
    let (id, token) = ctx.sign_up_and_in("alice", "pw").await;

    let (status, _) = ctx
        .request(
            Method::POST,
            "/api/items/bulk",
            Some(&token),
            Some(json!([
                { "title": "t1" },
                { "title": " " },
                { "title": "t3" },
            ])),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, list) = ctx.request(Method::GET, "/api/items", Some(&token), None).await;
    let titles: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["t1"]);
    assert_eq!(ctx.tasks.raw_task(1).unwrap().account_id, id);
}

#[tokio::test]
async fn test_bulk_create_overlong_title_is_validation_error() {
    let ctx = TestContext::new();
    let (_, token) = ctx.sign_up_and_in("alice", "pw").await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/api/items/bulk",
            Some(&token),
            Some(json!([
                { "title": "t1" },
                { "title": "x".repeat(256) },
            ])),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(ctx.tasks.row_count(), 1);
}

#[tokio::test]
async fn test_bulk_create_ignores_claimed_owner() {
    let ctx = TestContext::new();
    let (alice_id, alice) = ctx.sign_up_and_in("alice", "pw").await;
    let (bob_id, bob) = ctx.sign_up_and_in("bob", "pw").await;

    let (status, body) = ctx
        .request(
            Method::POST,
            "/api/items/bulk",
            Some(&alice),
            Some(json!([{ "title": "for bob?", "account_id": bob_id }])),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (_, bobs) = ctx.request(Method::GET, "/api/items", Some(&bob), None).await;
    assert_eq!(bobs, json!([]));
    assert_eq!(ctx.tasks.raw_task(1).unwrap().account_id, alice_id);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let ctx = TestContext::new();

    let (status, _) = ctx.request(Method::GET, "/api/nothing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// Notifications

#[tokio::test]
async fn test_strict_policy_returns_bad_gateway() {
    let ctx = TestContext::with_policy(NotifyPolicy::Strict);
    let (_, token) = ctx.sign_up_and_in("alice", "pw").await;
    ctx.notifier.set_failing(true);

    let (status, body) = ctx
        .request(
            Method::POST,
            "/api/items",
            Some(&token),
            Some(json!({ "title": "stored anyway" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "notify_failed");
    assert_eq!(ctx.tasks.row_count(), 1);
}

#[tokio::test]
async fn test_best_effort_policy_succeeds() {
    let ctx = TestContext::with_policy(NotifyPolicy::BestEffort);
    let (_, token) = ctx.sign_up_and_in("alice", "pw").await;
    ctx.notifier.set_failing(true);

    let id = ctx.create_item(&token, "stored", "").await;

    let (status, _) = ctx
        .request(Method::GET, &format!("/api/items/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_store_failure_is_opaque_500() {
    let ctx = TestContext::new();
    let (_, token) = ctx.sign_up_and_in("alice", "pw").await;
    ctx.tasks.set_unavailable(true);

    let (status, body) = ctx.request(Method::GET, "/api/items", Some(&token), None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert_eq!(body["message"], "An internal error occurred");
}
