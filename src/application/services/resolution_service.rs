//! Slug resolution for the public redirect endpoint.

use std::sync::Arc;

use crate::domain::repositories::{AccountRepository, LinkRepository};
use crate::error::AppError;

/// Outcome of resolving a slug.
///
/// Deliberately carries no reason for `NotFound`: callers must not be able to
/// tell a missing slug from a link whose owner is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Redirect(String),
    NotFound,
}

/// Why a resolution ended in [`Resolution::NotFound`]. Internal only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissReason {
    UnknownSlug,
    OwnerMissing,
    OwnerDeleted,
}

impl MissReason {
    fn as_str(self) -> &'static str {
        match self {
            MissReason::UnknownSlug => "unknown_slug",
            MissReason::OwnerMissing => "owner_missing",
            MissReason::OwnerDeleted => "owner_deleted",
        }
    }
}

/// Decides whether a slug redirects and where.
///
/// Checks run in a fixed order and stop at the first failure:
///
/// 1. Link lookup by exact slug
/// 2. Owner account lookup
/// 3. Owner soft-deletion
///
/// The link's own `is_active` flag and expiry are not re-evaluated here. They
/// are maintained eagerly by the account cascade and the external expiry sweep.
pub struct ResolutionService<L: ?Sized, A: ?Sized> {
    link_repository: Arc<L>,
    account_repository: Arc<A>,
}

impl<L, A> ResolutionService<L, A>
where
    L: LinkRepository + ?Sized,
    A: AccountRepository + ?Sized,
{
    /// Creates a new resolution service.
    pub fn new(link_repository: Arc<L>, account_repository: Arc<A>) -> Self {
        Self {
            link_repository,
            account_repository,
        }
    }

    /// Resolves a slug to a redirect target.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] only when the store itself fails. Every
    /// business-level miss is `Ok(Resolution::NotFound)`.
    pub async fn resolve(&self, slug: &str) -> Result<Resolution, AppError> {
        let Some(link) = self.link_repository.find_by_slug(slug).await? else {
            return Ok(self.miss(slug, MissReason::UnknownSlug));
        };

        let Some(owner) = self.account_repository.find_by_id(link.owner_id).await? else {
            tracing::warn!(
                slug,
                link_id = link.id,
                owner_id = link.owner_id,
                "Link references a missing account"
            );
            return Ok(self.miss(slug, MissReason::OwnerMissing));
        };

        if owner.is_deleted() {
            return Ok(self.miss(slug, MissReason::OwnerDeleted));
        }

        tracing::debug!(slug, target = %link.original_url, "Resolved slug");
        Ok(Resolution::Redirect(link.original_url))
    }

    fn miss(&self, slug: &str, reason: MissReason) -> Resolution {
        tracing::debug!(slug, reason = reason.as_str(), "Slug not resolvable");
        metrics::counter!("minify_resolution_not_found_total", "reason" => reason.as_str())
            .increment(1);
        Resolution::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Account, Link};
    use crate::domain::repositories::{MockAccountRepository, MockLinkRepository};
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn link(slug: &str, owner_id: i64, is_active: bool) -> Link {
        let now = Utc::now();
        Link::new(
            1,
            slug.to_string(),
            "https://example.com/target".to_string(),
            owner_id,
            now,
            now + Duration::days(30),
            is_active,
        )
    }

    fn account(id: i64, deleted: bool) -> Account {
        Account::new(
            id,
            "owner".to_string(),
            Utc::now(),
            deleted.then(Utc::now),
        )
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found_without_account_lookup() {
        let mut links = MockLinkRepository::new();
        links.expect_find_by_slug().times(1).returning(|_| Ok(None));
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_id().times(0);

        let service = ResolutionService::new(Arc::new(links), Arc::new(accounts));

        assert_eq!(service.resolve("ghost").await.unwrap(), Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_active_owner_redirects() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_slug()
            .withf(|slug| slug == "realslug")
            .returning(|slug| Ok(Some(link(slug, 5, true))));
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .withf(|id| *id == 5)
            .returning(|id| Ok(Some(account(id, false))));

        let service = ResolutionService::new(Arc::new(links), Arc::new(accounts));

        assert_eq!(
            service.resolve("realslug").await.unwrap(),
            Resolution::Redirect("https://example.com/target".to_string())
        );
    }

    #[tokio::test]
    async fn test_deleted_owner_is_not_found_even_if_link_active() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_slug()
            .returning(|slug| Ok(Some(link(slug, 5, true))));
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, true))));

        let service = ResolutionService::new(Arc::new(links), Arc::new(accounts));

        assert_eq!(service.resolve("realslug").await.unwrap(), Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_missing_owner_is_not_found() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_slug()
            .returning(|slug| Ok(Some(link(slug, 99, true))));
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_id().returning(|_| Ok(None));

        let service = ResolutionService::new(Arc::new(links), Arc::new(accounts));

        assert_eq!(service.resolve("orphan").await.unwrap(), Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_inactive_flag_is_trusted_to_the_cascade() {
        // The read path only consults owner state; a deactivated link with an
        // active owner still redirects until the flag is reconciled.
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_slug()
            .returning(|slug| Ok(Some(link(slug, 5, false))));
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, false))));

        let service = ResolutionService::new(Arc::new(links), Arc::new(accounts));

        assert!(matches!(
            service.resolve("paused").await.unwrap(),
            Resolution::Redirect(_)
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error_not_a_miss() {
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_slug()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        let accounts = MockAccountRepository::new();

        let service = ResolutionService::new(Arc::new(links), Arc::new(accounts));

        assert!(matches!(
            service.resolve("any").await,
            Err(AppError::Internal { .. })
        ));
    }
}
