//! PostgreSQL implementation of account repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Account, AccountPatch};
use crate::domain::repositories::AccountRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<AccountRow> for Account {
    fn from(r: AccountRow) -> Self {
        Account::new(r.id, r.name, r.created_at, r.deleted_at)
    }
}

/// PostgreSQL repository for accounts.
pub struct PgAccountRepository {
    pool: Arc<PgPool>,
}

impl PgAccountRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create(&self, name: &str) -> Result<Account, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (name)
            VALUES ($1)
            RETURNING id, name, created_at, deleted_at
            "#,
        )
        .bind(name)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, name, created_at, deleted_at FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Account::from))
    }

    async fn list(&self) -> Result<Vec<Account>, AppError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            "SELECT id, name, created_at, deleted_at FROM accounts ORDER BY id",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn update(&self, id: i64, patch: AccountPatch) -> Result<Account, AppError> {
        // `deleted_at` is tri-state: untouched, cleared, or set.
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE accounts
            SET deleted_at = CASE WHEN $2 THEN $3 ELSE deleted_at END,
                name = COALESCE($4, name)
            WHERE id = $1
            RETURNING id, name, created_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(patch.deleted_at.is_some())
        .bind(patch.deleted_at.flatten())
        .bind(patch.name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Account::from)
            .ok_or_else(|| AppError::not_found("Account not found", json!({ "account_id": id })))
    }
}
