#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use minify::application::services::auth_service::hash_token;
use minify::domain::entities::{Account, Link, LinkPatch, NewLink};
use minify::domain::repositories::{AccountRepository, LinkRepository, TokenRepository};
use minify::infrastructure::memory::MemoryStore;
use minify::infrastructure::persistence::{
    PgAccountRepository, PgLinkRepository, PgTokenRepository,
};
use minify::routes::router;
use minify::state::{AppState, StateSettings};

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const BASE_URL: &str = "https://min.fy";

pub fn settings() -> StateSettings {
    StateSettings {
        base_url: BASE_URL.to_string(),
        token_signing_secret: SIGNING_SECRET.to_string(),
        link_ttl_days: 30,
    }
}

pub fn memory_state(store: Arc<MemoryStore>) -> AppState {
    AppState::new(store.clone(), store.clone(), store, settings())
}

pub fn pg_state(pool: PgPool) -> AppState {
    let pool = Arc::new(pool);
    AppState::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgAccountRepository::new(pool.clone())),
        Arc::new(PgTokenRepository::new(pool)),
        settings(),
    )
}

/// A full router over a fresh in-memory store.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
}

pub fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let server = TestServer::new(router(memory_state(store.clone()))).unwrap();
    TestApp { server, store }
}

impl TestApp {
    /// Creates an account and returns it with a raw bearer token.
    pub async fn account(&self, name: &str) -> (Account, String) {
        seed_account(self.store.as_ref(), name).await
    }

    pub async fn link(&self, owner_id: i64, slug: &str, expires_at: DateTime<Utc>) -> Link {
        seed_link(self.store.as_ref(), owner_id, slug, expires_at).await
    }

    pub async fn stored_link(&self, slug: &str) -> Link {
        self.store.find_by_slug(slug).await.unwrap().unwrap()
    }

    pub async fn deactivate(&self, link_id: i64) {
        LinkRepository::update(self.store.as_ref(), link_id, LinkPatch::active(false))
            .await
            .unwrap();
    }
}

pub async fn seed_account<S>(store: &S, name: &str) -> (Account, String)
where
    S: AccountRepository + TokenRepository,
{
    let account = AccountRepository::create(store, name).await.unwrap();
    let raw = format!("token-{}-{name}", account.id);
    store
        .create_token(account.id, name, &hash_token(SIGNING_SECRET, &raw))
        .await
        .unwrap();
    (account, raw)
}

pub async fn seed_link<L>(store: &L, owner_id: i64, slug: &str, expires_at: DateTime<Utc>) -> Link
where
    L: LinkRepository + ?Sized,
{
    store
        .create(NewLink {
            slug: slug.to_string(),
            original_url: format!("https://example.com/{slug}"),
            owner_id,
            expires_at,
        })
        .await
        .unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
