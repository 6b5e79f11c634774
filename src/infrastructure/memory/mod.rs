//! In-process store implementing every repository trait.
//!
//! Backs the integration tests and local runs without PostgreSQL. Uniqueness
//! of `slug` and `token_hash` is enforced under the same lock as the insert,
//! so concurrent writers see the same conflict semantics as the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::entities::{Account, AccountPatch, Link, LinkPatch, NewLink};
use crate::domain::repositories::{AccountRepository, ApiToken, LinkRepository, TokenRepository};
use crate::error::AppError;
use crate::utils::db_error::LINKS_SLUG_CONSTRAINT;

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<i64, Account>,
    links: BTreeMap<i64, Link>,
    tokens: BTreeMap<i64, ApiToken>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_bulk_link_updates: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent [`LinkRepository::update_by_owner`] call fail.
    ///
    /// Used to exercise partially applied account cascades.
    pub fn fail_bulk_link_updates(&self, fail: bool) {
        self.fail_bulk_link_updates.store(fail, Ordering::SeqCst);
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables.lock().map_err(|_| {
            tracing::error!("Memory store lock poisoned");
            AppError::internal("Store unavailable", json!({}))
        })
    }
}

fn is_listed(link: &Link, owner_id: i64, now: DateTime<Utc>) -> bool {
    link.owner_id == owner_id && link.is_active && link.expires_at > now
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut tables = self.tables()?;

        if tables.links.values().any(|l| l.slug == new_link.slug) {
            return Err(AppError::conflict(
                "Slug already exists",
                json!({ "constraint": LINKS_SLUG_CONSTRAINT }),
            ));
        }

        if !tables.accounts.contains_key(&new_link.owner_id) {
            return Err(AppError::internal(
                "Database error",
                json!({ "constraint": "links_owner_id_fkey" }),
            ));
        }

        let id = tables.next_id();
        let link = Link::new(
            id,
            new_link.slug,
            new_link.original_url,
            new_link.owner_id,
            Utc::now(),
            new_link.expires_at,
            true,
        );
        tables.links.insert(id, link.clone());

        Ok(link)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        let tables = self.tables()?;
        Ok(tables.links.values().find(|l| l.slug == slug).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        Ok(self.tables()?.links.get(&id).cloned())
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError> {
        let mut tables = self.tables()?;
        let link = tables
            .links
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": id })))?;

        patch.apply(link);
        Ok(link.clone())
    }

    async fn update_by_owner(&self, owner_id: i64, patch: LinkPatch) -> Result<u64, AppError> {
        if self.fail_bulk_link_updates.load(Ordering::SeqCst) {
            return Err(AppError::internal("Database error", json!({})));
        }

        let mut tables = self.tables()?;
        let mut affected = 0;
        for link in tables.links.values_mut().filter(|l| l.owner_id == owner_id) {
            patch.apply(link);
            affected += 1;
        }

        Ok(affected)
    }

    async fn list_active_by_owner(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let tables = self.tables()?;
        let mut links: Vec<Link> = tables
            .links
            .values()
            .filter(|l| is_listed(l, owner_id, now))
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(links
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_active_by_owner(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let tables = self.tables()?;
        Ok(tables
            .links
            .values()
            .filter(|l| is_listed(l, owner_id, now))
            .count() as i64)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables()?.links.remove(&id).is_some())
    }

    async fn health_check(&self) -> bool {
        self.tables().is_ok()
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn create(&self, name: &str) -> Result<Account, AppError> {
        let mut tables = self.tables()?;
        let id = tables.next_id();
        let account = Account::new(id, name.to_string(), Utc::now(), None);
        tables.accounts.insert(id, account.clone());

        Ok(account)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError> {
        Ok(self.tables()?.accounts.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.tables()?.accounts.values().cloned().collect())
    }

    async fn update(&self, id: i64, patch: AccountPatch) -> Result<Account, AppError> {
        let mut tables = self.tables()?;
        let account = tables.accounts.get_mut(&id).ok_or_else(|| {
            AppError::not_found("Account not found", json!({ "account_id": id }))
        })?;

        patch.apply(account);
        Ok(account.clone())
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError> {
        let tables = self.tables()?;
        Ok(tables
            .tokens
            .values()
            .find(|t| t.token_hash == token_hash && !t.is_revoked())
            .cloned())
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        if let Some(token) = tables
            .tokens
            .values_mut()
            .find(|t| t.token_hash == token_hash && !t.is_revoked())
        {
            token.last_used_at = Some(Utc::now());
        }

        Ok(())
    }

    async fn create_token(
        &self,
        account_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let mut tables = self.tables()?;

        if tables.tokens.values().any(|t| t.token_hash == token_hash) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "api_tokens_token_hash_key" }),
            ));
        }

        let id = tables.next_id();
        let token = ApiToken {
            id,
            account_id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        tables.tokens.insert(id, token.clone());

        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        let mut tokens: Vec<ApiToken> = self.tables()?.tokens.values().cloned().collect();
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tokens)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        Ok(self.tables()?.tokens.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let tables = self.tables()?;
        Ok(tables.tokens.values().find(|t| t.name == name).cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        if let Some(token) = tables.tokens.get_mut(&id).filter(|t| !t.is_revoked()) {
            token.revoked_at = Some(Utc::now());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_link(slug: &str, owner_id: i64) -> NewLink {
        NewLink {
            slug: slug.to_string(),
            original_url: "https://example.com".to_string(),
            owner_id,
            expires_at: Utc::now() + Duration::days(30),
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_conflict() {
        let store = MemoryStore::new();
        let owner = AccountRepository::create(&store, "alice").await.unwrap();

        LinkRepository::create(&store, new_link("team", owner.id))
            .await
            .unwrap();
        let second = LinkRepository::create(&store, new_link("team", owner.id)).await;

        assert!(matches!(second, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_by_owner_counts_only_owned_links() {
        let store = MemoryStore::new();
        let alice = AccountRepository::create(&store, "alice").await.unwrap();
        let bob = AccountRepository::create(&store, "bob").await.unwrap();

        for slug in ["one1", "two2"] {
            LinkRepository::create(&store, new_link(slug, alice.id))
                .await
                .unwrap();
        }
        LinkRepository::create(&store, new_link("bobs", bob.id))
            .await
            .unwrap();

        let affected = store
            .update_by_owner(alice.id, LinkPatch::active(false))
            .await
            .unwrap();

        assert_eq!(affected, 2);
        let bobs = store.find_by_slug("bobs").await.unwrap().unwrap();
        assert!(bobs.is_active);
    }

    #[tokio::test]
    async fn test_listing_hides_inactive_and_expired() {
        let store = MemoryStore::new();
        let owner = AccountRepository::create(&store, "alice").await.unwrap();
        let now = Utc::now();

        let live = LinkRepository::create(&store, new_link("live", owner.id))
            .await
            .unwrap();
        let paused = LinkRepository::create(&store, new_link("paused", owner.id))
            .await
            .unwrap();
        LinkRepository::update(&store, paused.id, LinkPatch::active(false))
            .await
            .unwrap();
        let mut old = new_link("stale", owner.id);
        old.expires_at = now - Duration::days(1);
        LinkRepository::create(&store, old).await.unwrap();

        let listed = store
            .list_active_by_owner(owner.id, now, 10, 0)
            .await
            .unwrap();

        assert_eq!(listed, vec![live]);
        assert_eq!(store.count_active_by_owner(owner.id, now).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_injected_bulk_failure() {
        let store = MemoryStore::new();
        store.fail_bulk_link_updates(true);

        assert!(store.update_by_owner(1, LinkPatch::active(false)).await.is_err());
    }

    #[tokio::test]
    async fn test_revoked_token_not_active() {
        let store = MemoryStore::new();
        let token = store.create_token(1, "ci", "hash").await.unwrap();

        store.revoke_token(token.id).await.unwrap();

        assert!(store.find_active("hash").await.unwrap().is_none());
    }
}
