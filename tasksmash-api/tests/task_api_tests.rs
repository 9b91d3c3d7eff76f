/// Tasks, comments, follows and the dashboard over HTTP

mod common;

use axum::http::{Method, StatusCode};
use common::TestContext;
use serde_json::json;

#[tokio::test]
async fn test_task_lifecycle() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice").await;

    let task_id = ctx.create_task(&alice, "Water the plants").await;

    let (status, list) = ctx.get("/v1/tasks", &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, edited) = ctx
        .send(
            Method::PUT,
            &format!("/v1/tasks/{}", task_id),
            Some(&alice.token),
            Some(json!({ "content": "Water the cactus" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["content"], "Water the cactus");

    let (status, view) = ctx.get(&format!("/v1/tasks/{}", task_id), &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["owner_username"], "alice");

    let (status, deleted) = ctx
        .send(Method::DELETE, &format!("/v1/tasks/{}", task_id), Some(&alice.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["task_id"], task_id);

    let (status, _) = ctx.get(&format!("/v1/tasks/{}", task_id), &alice.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_content_too_long() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice").await;

    let (status, body) = ctx
        .post("/v1/tasks", &alice.token, json!({ "content": "x".repeat(201) }))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "content");
}

#[tokio::test]
async fn test_other_account_cannot_edit_or_delete() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice").await;
    let bobby = ctx.register("bobby").await;
    let task_id = ctx.create_task(&alice, "Mine").await;
    let path = format!("/v1/tasks/{}", task_id);

    let (status, _) = ctx
        .send(Method::PUT, &path, Some(&bobby.token), Some(json!({ "content": "Mine now" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.send(Method::DELETE, &path, Some(&bobby.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Viewing is open to every signed-in account
    let (status, view) = ctx.get(&path, &bobby.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["task"]["content"], "Mine");
}

#[tokio::test]
async fn test_comment_thread() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice").await;
    let bobby = ctx.register("bobby").await;
    let task_id = ctx.create_task(&alice, "Plan the party").await;

    let c1 = ctx.comment(&bobby, task_id, "Saturday?", None).await;
    let c2 = ctx.comment(&alice, task_id, "Works for me", Some(c1)).await;
    let c3 = ctx.comment(&bobby, task_id, "Bring snacks", None).await;

    let (status, top) = ctx
        .get(&format!("/v1/tasks/{}/comments", task_id), &alice.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let top_ids: Vec<i64> = top.as_array().unwrap().iter().map(|c| c["id"].as_i64().unwrap()).collect();
    assert_eq!(top_ids, vec![c1, c3]);

    let (status, replies) = ctx.get(&format!("/v1/comments/{}/replies", c1), &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replies[0]["id"], c2);
    assert_eq!(replies.as_array().unwrap().len(), 1);

    let (_, view) = ctx.get(&format!("/v1/tasks/{}", task_id), &alice.token).await;
    let thread: Vec<(i64, u64)> = view["thread"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| (e["id"].as_i64().unwrap(), e["depth"].as_u64().unwrap()))
        .collect();
    assert_eq!(thread, vec![(c1, 0), (c2, 1), (c3, 0)]);
}

#[tokio::test]
async fn test_comment_errors() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice").await;
    let t1 = ctx.create_task(&alice, "One").await;
    let t2 = ctx.create_task(&alice, "Two").await;
    let on_t1 = ctx.comment(&alice, t1, "hello", None).await;

    let (status, body) = ctx
        .post("/v1/tasks/999/comments", &alice.token, json!({ "content": "hi" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");

    let (status, body) = ctx
        .post(
            &format!("/v1/tasks/{}/comments", t2),
            &alice.token,
            json!({ "content": "cross", "parent_id": on_t1 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Parent comment not found");

    let (status, _) = ctx.get("/v1/comments/999/replies", &alice.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_follow_flow_and_dashboard() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice").await;
    let bobby = ctx.register("bobby").await;
    let carol = ctx.register("carol").await;
    ctx.create_task(&alice, "alice task").await;
    let bob_task = ctx.create_task(&bobby, "bob task").await;

    let follow_path = format!("/v1/follows/{}", bobby.id);
    let (status, body) = ctx.send(Method::POST, &follow_path, Some(&alice.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "followed");

    let (status, body) = ctx.send(Method::POST, &follow_path, Some(&alice.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "already_following");

    let (_, following) = ctx.get("/v1/follows", &alice.token).await;
    assert_eq!(following, json!([{ "id": bobby.id, "username": "bobby" }]));

    let (_, followers) = ctx.get("/v1/followers", &bobby.token).await;
    assert_eq!(followers[0]["username"], "alice");

    let (status, dashboard) = ctx.get("/v1/dashboard", &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["own_tasks"].as_array().unwrap().len(), 1);
    assert_eq!(dashboard["followed_tasks"][0]["id"], bob_task);
    assert_eq!(
        dashboard["suggested_accounts"],
        json!([{ "id": carol.id, "username": "carol" }])
    );

    let (_, body) = ctx.send(Method::DELETE, &follow_path, Some(&alice.token), None).await;
    assert_eq!(body["outcome"], "unfollowed");
    let (_, body) = ctx.send(Method::DELETE, &follow_path, Some(&alice.token), None).await;
    assert_eq!(body["outcome"], "not_following");

    let (_, dashboard) = ctx.get("/v1/dashboard", &alice.token).await;
    assert!(dashboard["followed_tasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_follow_self_and_unknown() {
    let ctx = TestContext::new();
    let alice = ctx.register("alice").await;

    let (status, body) = ctx
        .send(Method::POST, &format!("/v1/follows/{}", alice.id), Some(&alice.token), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "account_id");

    let (status, _) = ctx.send(Method::POST, "/v1/follows/4242", Some(&alice.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
