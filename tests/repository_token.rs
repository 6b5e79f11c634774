mod common;

use sqlx::PgPool;
use std::sync::Arc;

use minify::domain::repositories::{AccountRepository, TokenRepository};
use minify::error::AppError;
use minify::infrastructure::persistence::{PgAccountRepository, PgTokenRepository};

async fn account_id(pool: &PgPool) -> i64 {
    PgAccountRepository::new(Arc::new(pool.clone()))
        .create("alice")
        .await
        .unwrap()
        .id
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_and_find_active(pool: PgPool) {
    let owner = account_id(&pool).await;
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create_token(owner, "ci", "hash-1").await.unwrap();
    assert_eq!(token.account_id, owner);

    let found = repo.find_active("hash-1").await.unwrap().unwrap();
    assert_eq!(found.id, token.id);
    assert!(repo.find_active("unknown").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_hash_is_conflict(pool: PgPool) {
    let owner = account_id(&pool).await;
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create_token(owner, "one", "same").await.unwrap();
    let result = repo.create_token(owner, "two", "same").await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_revoked_token_is_not_active(pool: PgPool) {
    let owner = account_id(&pool).await;
    let repo = PgTokenRepository::new(Arc::new(pool));
    let token = repo.create_token(owner, "ci", "hash-2").await.unwrap();

    repo.revoke_token(token.id).await.unwrap();

    assert!(repo.find_active("hash-2").await.unwrap().is_none());
    assert!(repo.find_by_id(token.id).await.unwrap().unwrap().is_revoked());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_last_used(pool: PgPool) {
    let owner = account_id(&pool).await;
    let repo = PgTokenRepository::new(Arc::new(pool));
    repo.create_token(owner, "ci", "hash-3").await.unwrap();

    repo.update_last_used("hash-3").await.unwrap();

    let token = repo.find_by_name("ci").await.unwrap().unwrap();
    assert!(token.last_used_at.is_some());
}
