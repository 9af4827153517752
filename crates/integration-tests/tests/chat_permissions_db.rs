//! Integration tests for the chat permission repository.
//!
//! These tests require a disposable `PostgreSQL` database in
//! `ADMIN_DATABASE_URL`; migrations are applied before each test.

use secrecy::SecretString;
use sqlx::PgPool;

use clerk_admin::db::ChatPermissionRepository;
use clerk_admin::models::PermissionGrant;
use clerk_admin::ports::PermissionStore;
use clerk_admin_core::UserId;
use clerk_admin_integration_tests::unique_user_id;

async fn pool() -> PgPool {
    let url = std::env::var("ADMIN_DATABASE_URL").expect("ADMIN_DATABASE_URL must be set");
    let pool = clerk_admin::db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect");
    sqlx::migrate!("../admin/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

fn user(id: &str) -> UserId {
    UserId::parse(id).expect("valid user id")
}

async fn rows_for(pool: &PgPool, user_id: &UserId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM chat_permissions WHERE user_id = $1")
        .bind(user_id.as_str())
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_grant_twice_keeps_one_row() {
    let pool = pool().await;
    let repo = ChatPermissionRepository::new(&pool);
    let target = user(&unique_user_id("grant"));

    repo.upsert(&PermissionGrant::now(
        target.clone(),
        Some(user("user_admin_a")),
        Some("first"),
    ))
    .await
    .expect("first grant");
    let second = repo
        .upsert(&PermissionGrant::now(
            target.clone(),
            Some(user("user_admin_b")),
            Some("second"),
        ))
        .await
        .expect("second grant");

    assert!(second.enabled);
    assert_eq!(second.granted_by, Some(user("user_admin_b")));
    assert_eq!(second.notes.as_deref(), Some("second"));
    assert_eq!(rows_for(&pool, &target).await, 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_revoke_twice_keeps_one_disabled_row() {
    let pool = pool().await;
    let repo = ChatPermissionRepository::new(&pool);
    let target = user(&unique_user_id("revoke"));

    repo.upsert(&PermissionGrant::now(target.clone(), None, None))
        .await
        .expect("grant");
    assert!(repo.set_enabled(&target, false).await.expect("revoke"));
    assert!(repo.set_enabled(&target, false).await.expect("revoke again"));

    let record = repo.get(&target).await.expect("get").expect("row exists");
    assert!(!record.enabled);
    assert_eq!(rows_for(&pool, &target).await, 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_revoke_unknown_user_is_noop() {
    let pool = pool().await;
    let repo = ChatPermissionRepository::new(&pool);
    let target = user(&unique_user_id("unknown"));

    assert!(!repo.set_enabled(&target, false).await.expect("revoke"));
    assert_eq!(rows_for(&pool, &target).await, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_list_is_newest_first() {
    let pool = pool().await;
    let store: &dyn PermissionStore = &ChatPermissionRepository::new(&pool);

    let older = user(&unique_user_id("older"));
    let newer = user(&unique_user_id("newer"));
    store
        .upsert_permission(&PermissionGrant::now(older.clone(), None, None))
        .await
        .expect("grant older");
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    store
        .upsert_permission(&PermissionGrant::now(newer.clone(), None, None))
        .await
        .expect("grant newer");

    let ids: Vec<UserId> = store
        .list_permissions()
        .await
        .expect("list")
        .into_iter()
        .map(|p| p.user_id)
        .filter(|id| *id == older || *id == newer)
        .collect();
    assert_eq!(ids, vec![newer, older]);
}
