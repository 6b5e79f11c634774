//! Owner-scoped link management: create, list, extend and delete.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::application::services::slug_allocator::{LinkDraft, SlugAllocator};
use crate::domain::entities::{Account, Link};
use crate::domain::lifecycle;
use crate::domain::repositories::{AccountRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::destination_url::validate_destination_url;

/// Default lifetime of a new link.
pub const DEFAULT_LINK_TTL_DAYS: i64 = 30;

/// A page of links plus the total they were drawn from.
#[derive(Debug, Clone)]
pub struct LinkPage {
    pub links: Vec<Link>,
    pub total: i64,
}

/// Service for the link operations an authenticated account can perform.
///
/// Every method takes the caller's account id, already resolved by the auth
/// layer. Soft-deleted accounts may not manage links until reactivated.
pub struct LinkService<L: ?Sized, A: ?Sized> {
    link_repository: Arc<L>,
    account_repository: Arc<A>,
    allocator: SlugAllocator<L>,
    link_ttl_days: i64,
}

impl<L, A> LinkService<L, A>
where
    L: LinkRepository + ?Sized,
    A: AccountRepository + ?Sized,
{
    /// Creates a new link service with the default link lifetime.
    pub fn new(link_repository: Arc<L>, account_repository: Arc<A>) -> Self {
        Self::with_ttl_days(link_repository, account_repository, DEFAULT_LINK_TTL_DAYS)
    }

    /// Creates a new link service whose links live `ttl_days` before expiring.
    pub fn with_ttl_days(link_repository: Arc<L>, account_repository: Arc<A>, ttl_days: i64) -> Self {
        Self {
            allocator: SlugAllocator::new(link_repository.clone()),
            link_repository,
            account_repository,
            link_ttl_days: ttl_days,
        }
    }

    /// Creates a short link for `owner_id`.
    ///
    /// # Flow
    ///
    /// 1. Reject callers whose account is soft-deleted
    /// 2. Validate the destination URL
    /// 3. Allocate a candidate slug (custom or random)
    /// 4. Commit the insert; the store's unique constraint settles races
    ///
    /// # Errors
    ///
    /// - [`AppError::Forbidden`] if the account is soft-deleted
    /// - [`AppError::Validation`] for a bad URL, malformed or reserved slug
    /// - [`AppError::Conflict`] if the slug is taken
    /// - [`AppError::Exhausted`] if no random slug could be found
    pub async fn create_link(
        &self,
        owner_id: i64,
        original_url: &str,
        custom_slug: Option<&str>,
    ) -> Result<Link, AppError> {
        self.require_active_account(owner_id).await?;

        let original_url = validate_destination_url(original_url).map_err(|e| {
            AppError::bad_request(e.to_string(), json!({ "field": "url" }))
        })?;

        let candidate = self.allocator.allocate(custom_slug).await?;

        let draft = LinkDraft {
            original_url,
            owner_id,
            expires_at: lifecycle::initial_expiry(Utc::now(), self.link_ttl_days),
        };

        let link = self.allocator.commit(candidate, draft).await?;

        tracing::info!(link_id = link.id, slug = %link.slug, owner_id, "Link created");
        Ok(link)
    }

    /// Lists the owner's active, unexpired links, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] if the account is soft-deleted.
    pub async fn list_links(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<LinkPage, AppError> {
        self.require_active_account(owner_id).await?;

        let links = self
            .link_repository
            .list_active_by_owner(owner_id, now, limit, offset)
            .await?;
        let total = self
            .link_repository
            .count_active_by_owner(owner_id, now)
            .await?;

        Ok(LinkPage { links, total })
    }

    /// Extends a link's expiry by seven days and reactivates it.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the link does not exist or belongs to someone else
    /// - [`AppError::Forbidden`] if the account is soft-deleted
    pub async fn extend_link(&self, owner_id: i64, link_id: i64) -> Result<Link, AppError> {
        self.require_active_account(owner_id).await?;

        let link = self
            .link_repository
            .find_by_id(link_id)
            .await?
            .filter(|link| link.is_owned_by(owner_id))
            .ok_or_else(|| {
                AppError::not_found(
                    "Link not found or unauthorized",
                    json!({ "link_id": link_id }),
                )
            })?;

        let patch = lifecycle::extend(&link);
        let updated = self.link_repository.update(link.id, patch).await?;

        tracing::info!(
            link_id,
            old_expires_at = %link.expires_at,
            new_expires_at = %updated.expires_at,
            "Link extended"
        );
        Ok(updated)
    }

    /// Permanently deletes a link owned by the caller.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the link does not exist
    /// - [`AppError::Forbidden`] if it belongs to another account, or the
    ///   caller's account is soft-deleted
    pub async fn delete_link(&self, owner_id: i64, link_id: i64) -> Result<(), AppError> {
        self.require_active_account(owner_id).await?;

        let link = self
            .link_repository
            .find_by_id(link_id)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "link_id": link_id })))?;

        if !link.is_owned_by(owner_id) {
            return Err(AppError::forbidden(
                "Unauthorized to delete this link",
                json!({ "link_id": link_id }),
            ));
        }

        if !self.link_repository.delete(link_id).await? {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "link_id": link_id }),
            ));
        }

        tracing::info!(link_id, slug = %link.slug, owner_id, "Link deleted");
        Ok(())
    }

    /// Constructs the full short URL for a slug.
    pub fn short_url(base_url: &str, slug: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), slug)
    }

    async fn require_active_account(&self, account_id: i64) -> Result<Account, AppError> {
        let account = self
            .account_repository
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Account not found", json!({ "account_id": account_id }))
            })?;

        if account.is_deleted() {
            return Err(AppError::forbidden(
                "Account is deleted",
                json!({ "account_id": account_id, "reactivate": "/api/account/reactivate" }),
            ));
        }

        Ok(account)
    }
}
