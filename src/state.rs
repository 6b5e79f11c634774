//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{
    AccountService, AuthService, LinkService, ResolutionService,
};
use crate::domain::repositories::{AccountRepository, LinkRepository, TokenRepository};

pub type DynLinkService = LinkService<dyn LinkRepository, dyn AccountRepository>;
pub type DynResolutionService = ResolutionService<dyn LinkRepository, dyn AccountRepository>;
pub type DynAccountService = AccountService<dyn AccountRepository, dyn LinkRepository>;
pub type DynAuthService = AuthService<dyn TokenRepository>;

/// Cloneable handle to services and settings.
///
/// Services are built over trait objects so the same router runs on
/// PostgreSQL in production and on the in-memory store in tests.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub resolution_service: Arc<DynResolutionService>,
    pub account_service: Arc<DynAccountService>,
    pub auth_service: Arc<DynAuthService>,
    pub link_repository: Arc<dyn LinkRepository>,
    pub base_url: String,
}

/// Settings the state needs beyond the repositories.
#[derive(Debug, Clone)]
pub struct StateSettings {
    pub base_url: String,
    pub token_signing_secret: String,
    pub link_ttl_days: i64,
}

impl AppState {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        account_repository: Arc<dyn AccountRepository>,
        token_repository: Arc<dyn TokenRepository>,
        settings: StateSettings,
    ) -> Self {
        Self {
            link_service: Arc::new(LinkService::with_ttl_days(
                link_repository.clone(),
                account_repository.clone(),
                settings.link_ttl_days,
            )),
            resolution_service: Arc::new(ResolutionService::new(
                link_repository.clone(),
                account_repository.clone(),
            )),
            account_service: Arc::new(AccountService::new(
                account_repository,
                link_repository.clone(),
            )),
            auth_service: Arc::new(AuthService::new(
                token_repository,
                settings.token_signing_secret,
            )),
            link_repository,
            base_url: settings.base_url,
        }
    }
}
