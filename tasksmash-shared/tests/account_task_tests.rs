/// Accounts and task ownership through the services

mod common;

use common::{TestContext, SECRET};
use tasksmash_shared::auth::jwt::validate_session_token;
use tasksmash_shared::error::CoreError;
use tasksmash_shared::store::Store;

#[tokio::test]
async fn test_register_and_login() {
    let ctx = TestContext::new();
    let alice = ctx.account("alice").await;

    assert_eq!(alice.username, "alice");
    assert_ne!(alice.password_hash, "pw123");

    let session = ctx.services.accounts.authenticate("alice", "pw123").await.unwrap();
    assert_eq!(session.account.id, alice.id);

    let claims = validate_session_token(&session.token, SECRET).unwrap();
    assert_eq!(claims.sub, alice.id);
}

#[tokio::test]
async fn test_duplicate_username_and_email_conflict() {
    let ctx = TestContext::new();
    ctx.account("alice").await;
    let accounts = &ctx.services.accounts;

    assert!(matches!(
        accounts.register("alice", "other@example.com", "pw123").await,
        Err(CoreError::Conflict(ref m)) if m == "Username already taken"
    ));
    assert!(matches!(
        accounts.register("alicia", "ALICE@example.com", "pw123").await,
        Err(CoreError::Conflict(ref m)) if m == "Email already registered"
    ));
}

#[tokio::test]
async fn test_register_rejects_malformed_input() {
    let ctx = TestContext::new();
    let accounts = &ctx.services.accounts;

    assert!(matches!(
        accounts.register("bob", "bob@example.com", "pw123").await,
        Err(CoreError::Validation { field: "username", .. })
    ));
    assert!(matches!(
        accounts.register("bobby", "not-an-email", "pw123").await,
        Err(CoreError::Validation { field: "email", .. })
    ));
    assert!(matches!(
        accounts.register("bobby", "bob@example.com", "").await,
        Err(CoreError::Validation { field: "password", .. })
    ));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new();
    ctx.account("alice").await;
    let accounts = &ctx.services.accounts;

    let wrong_password = accounts.authenticate("alice", "nope").await.unwrap_err();
    let unknown_user = accounts.authenticate("mallory", "pw123").await.unwrap_err();

    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn test_change_password_requires_current() {
    let ctx = TestContext::new();
    let alice = ctx.account("alice").await;
    let accounts = &ctx.services.accounts;

    assert!(matches!(
        accounts.change_password(alice.id, "wrong", "fresh-pass").await,
        Err(CoreError::Unauthorized(_))
    ));

    accounts.change_password(alice.id, "pw123", "fresh-pass").await.unwrap();
    assert!(accounts.authenticate("alice", "fresh-pass").await.is_ok());
    assert!(accounts.authenticate("alice", "pw123").await.is_err());
}

#[tokio::test]
async fn test_task_crud_by_owner() {
    let ctx = TestContext::new();
    let alice = ctx.account("alice").await;
    let tasks = &ctx.services.tasks;

    let first = tasks.create_task(alice.id, "  Buy milk  ").await.unwrap();
    let second = tasks.create_task(alice.id, "Walk the dog").await.unwrap();
    assert_eq!(first.content, "Buy milk");

    let own: Vec<i64> = tasks.list_own(alice.id).await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(own, vec![first.id, second.id]);

    let edited = tasks.edit_task(alice.id, first.id, "Buy oat milk").await.unwrap();
    assert_eq!(edited.content, "Buy oat milk");

    let view = tasks.get_task(first.id).await.unwrap();
    assert_eq!(view.owner_username, "alice");
    assert!(view.thread.is_empty());

    tasks.delete_task(alice.id, second.id).await.unwrap();
    assert!(matches!(tasks.get_task(second.id).await, Err(CoreError::NotFound("Task"))));
}

#[tokio::test]
async fn test_task_content_limits() {
    let ctx = TestContext::new();
    let alice = ctx.account("alice").await;
    let tasks = &ctx.services.tasks;

    assert!(matches!(
        tasks.create_task(alice.id, "").await,
        Err(CoreError::Validation { field: "content", .. })
    ));
    assert!(tasks.create_task(alice.id, &"x".repeat(200)).await.is_ok());
    assert!(tasks.create_task(alice.id, &"x".repeat(201)).await.is_err());
}

#[tokio::test]
async fn test_non_owner_cannot_change_task() {
    let ctx = TestContext::new();
    let alice = ctx.account("alice").await;
    let bobby = ctx.account("bobby").await;
    let tasks = &ctx.services.tasks;

    let task = tasks.create_task(alice.id, "Mine").await.unwrap();

    assert!(matches!(
        tasks.edit_task(bobby.id, task.id, "Yours now").await,
        Err(CoreError::Forbidden(_))
    ));
    assert!(matches!(
        tasks.delete_task(bobby.id, task.id).await,
        Err(CoreError::Forbidden(_))
    ));
    assert_eq!(tasks.get_task(task.id).await.unwrap().task.content, "Mine");
}

#[tokio::test]
async fn test_delete_account_cascades() {
    let ctx = TestContext::new();
    let alice = ctx.account("alice").await;
    let bobby = ctx.account("bobby").await;

    let alice_task = ctx.services.tasks.create_task(alice.id, "alice task").await.unwrap();
    let bob_task = ctx.services.tasks.create_task(bobby.id, "bob task").await.unwrap();
    let on_alice = ctx
        .services
        .comments
        .add_comment(alice_task.id, bobby.id, "bob on alice", None)
        .await
        .unwrap();
    let by_alice = ctx
        .services
        .comments
        .add_comment(bob_task.id, alice.id, "alice on bob", None)
        .await
        .unwrap();
    ctx.services.social.follow(alice.id, bobby.id).await.unwrap();
    ctx.services.social.follow(bobby.id, alice.id).await.unwrap();

    assert!(ctx.services.accounts.delete_account(alice.id).await.unwrap());
    assert!(!ctx.services.accounts.delete_account(alice.id).await.unwrap());

    assert!(ctx.store.find_account(alice.id).await.unwrap().is_none());
    assert!(ctx.store.find_task(alice_task.id).await.unwrap().is_none());
    assert!(ctx.store.find_comment(on_alice.id).await.unwrap().is_none());
    assert!(ctx.store.find_comment(by_alice.id).await.unwrap().is_none());
    assert!(ctx.store.find_task(bob_task.id).await.unwrap().is_some());
    assert!(ctx.services.accounts.list_followers(bobby.id).await.unwrap().is_empty());
    assert!(ctx.services.accounts.list_following(bobby.id).await.unwrap().is_empty());
}
