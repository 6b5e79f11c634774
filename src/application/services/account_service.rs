//! Account soft deletion and reactivation, cascaded to owned links.
//!
//! Both operations are a two-step saga without a surrounding transaction:
//!
//! 1. Write the account row (the authoritative flag for resolution)
//! 2. Bulk-update `is_active` on every link the account owns
//!
//! A resolution racing step 2 already sees the account change and answers
//! accordingly, so the link flag is a secondary guard used by listings. If
//! step 2 fails, step 1 is not rolled back and the failure is reported as
//! [`CascadeError::PartialCascade`]. Re-running a soft delete repeats the
//! idempotent fan-out. A reactivation whose fan-out failed leaves an active
//! account behind, so it is completed with
//! [`AccountService::resume_reactivation`] instead.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::domain::entities::{Account, AccountPatch, LinkPatch};
use crate::domain::lifecycle::{self, AccountStatus};
use crate::domain::repositories::{AccountRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::display_name::validate_display_name;

/// Which cascade was running when a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOperation {
    SoftDelete,
    Reactivate,
}

impl fmt::Display for CascadeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CascadeOperation::SoftDelete => write!(f, "soft-delete"),
            CascadeOperation::Reactivate => write!(f, "reactivate"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    #[error("account {0} not found")]
    AccountNotFound(i64),

    /// Nothing was written.
    #[error(transparent)]
    Store(AppError),

    /// The account write persisted; the link fan-out did not.
    #[error("{operation} of account {account_id} applied, link fan-out failed: {source}")]
    PartialCascade {
        account_id: i64,
        operation: CascadeOperation,
        #[source]
        source: AppError,
    },
}

/// Result of a soft delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletionRecord {
    pub account_id: i64,
    pub deleted_at: DateTime<Utc>,
    pub deletion_deadline: DateTime<Utc>,
    /// Links whose `is_active` flag was (re)set to false.
    pub links_deactivated: u64,
    /// True if the account was already soft-deleted and only the fan-out ran.
    pub already_deleted: bool,
}

/// Result of a reactivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReactivationRecord {
    /// The account was not deleted; nothing was written.
    AlreadyActive { account_id: i64 },
    Reactivated { account_id: i64, links_reactivated: u64 },
    /// Only the link fan-out ran, for an account that was already active.
    Resumed { account_id: i64, links_reactivated: u64 },
}

/// Service for account lifecycle operations.
pub struct AccountService<A: ?Sized, L: ?Sized> {
    account_repository: Arc<A>,
    link_repository: Arc<L>,
}

impl<A, L> AccountService<A, L>
where
    A: AccountRepository + ?Sized,
    L: LinkRepository + ?Sized,
{
    /// Creates a new account service.
    pub fn new(account_repository: Arc<A>, link_repository: Arc<L>) -> Self {
        Self {
            account_repository,
            link_repository,
        }
    }

    /// Loads an account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the account does not exist.
    pub async fn get_account(&self, account_id: i64) -> Result<Account, AppError> {
        self.account_repository
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Account not found",
                    serde_json::json!({ "account_id": account_id }),
                )
            })
    }

    /// Returns the lifecycle status of an account at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the account does not exist.
    pub async fn status(
        &self,
        account_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(Account, AccountStatus), AppError> {
        let account = self.get_account(account_id).await?;
        let status = lifecycle::account_status(&account, now);
        Ok((account, status))
    }

    /// Changes the display name of an active account.
    ///
    /// The name is trimmed and must be 2-50 characters without digits.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the name is rejected
    /// - [`AppError::NotFound`] if the account does not exist
    /// - [`AppError::Forbidden`] if the account is soft-deleted
    pub async fn rename(&self, account_id: i64, raw_name: &str) -> Result<Account, AppError> {
        let name = validate_display_name(raw_name).map_err(|e| {
            AppError::bad_request(e.to_string(), serde_json::json!({ "field": "name" }))
        })?;

        let account = self.get_account(account_id).await?;
        if account.is_deleted() {
            return Err(AppError::forbidden(
                "Account is deleted",
                serde_json::json!({ "account_id": account_id }),
            ));
        }

        let account = self
            .account_repository
            .update(account_id, AccountPatch::rename(name))
            .await?;

        tracing::info!(account_id, "Account renamed");
        Ok(account)
    }

    /// Soft-deletes an account and deactivates all of its links.
    ///
    /// If the account is already deleted, its original `deleted_at` is kept
    /// and only the link fan-out is re-applied.
    ///
    /// # Errors
    ///
    /// - [`CascadeError::AccountNotFound`] if the account does not exist
    /// - [`CascadeError::Store`] if the account write fails (nothing applied)
    /// - [`CascadeError::PartialCascade`] if the link fan-out fails
    pub async fn soft_delete(&self, account_id: i64) -> Result<DeletionRecord, CascadeError> {
        let account = self.load(account_id).await?;

        let (deleted_at, already_deleted) = match account.deleted_at {
            Some(deleted_at) => (deleted_at, true),
            None => {
                let now = Utc::now();
                self.account_repository
                    .update(account_id, AccountPatch::soft_delete(now))
                    .await
                    .map_err(CascadeError::Store)?;
                (now, false)
            }
        };

        let links_deactivated = self
            .fan_out(account_id, false, CascadeOperation::SoftDelete)
            .await?;

        tracing::info!(
            account_id,
            links_deactivated,
            already_deleted,
            "Account soft-deleted"
        );

        Ok(DeletionRecord {
            account_id,
            deleted_at,
            deletion_deadline: lifecycle::deletion_deadline(deleted_at),
            links_deactivated,
            already_deleted,
        })
    }

    /// Reactivates a soft-deleted account and reactivates all of its links.
    ///
    /// Link expiry is left untouched: a link that expired while the account
    /// was deleted is active again but still classified as expired.
    ///
    /// # Errors
    ///
    /// - [`CascadeError::AccountNotFound`] if the account does not exist
    /// - [`CascadeError::Store`] if the account write fails (nothing applied)
    /// - [`CascadeError::PartialCascade`] if the link fan-out fails
    pub async fn reactivate(&self, account_id: i64) -> Result<ReactivationRecord, CascadeError> {
        let account = self.load(account_id).await?;

        if !account.is_deleted() {
            tracing::debug!(account_id, "Reactivation requested for active account");
            return Ok(ReactivationRecord::AlreadyActive { account_id });
        }

        self.account_repository
            .update(account_id, AccountPatch::reactivate())
            .await
            .map_err(CascadeError::Store)?;

        let links_reactivated = self
            .fan_out(account_id, true, CascadeOperation::Reactivate)
            .await?;

        tracing::info!(account_id, links_reactivated, "Account reactivated");

        Ok(ReactivationRecord::Reactivated {
            account_id,
            links_reactivated,
        })
    }

    /// Re-runs the link fan-out of a reactivation.
    ///
    /// Recovery path after [`Self::reactivate`] failed with
    /// [`CascadeError::PartialCascade`]: the account is active again but its
    /// links are still flagged inactive. A soft-deleted account goes through
    /// the full [`Self::reactivate`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::reactivate`].
    pub async fn resume_reactivation(
        &self,
        account_id: i64,
    ) -> Result<ReactivationRecord, CascadeError> {
        let account = self.load(account_id).await?;

        if account.is_deleted() {
            return self.reactivate(account_id).await;
        }

        let links_reactivated = self
            .fan_out(account_id, true, CascadeOperation::Reactivate)
            .await?;

        tracing::info!(account_id, links_reactivated, "Account reactivation resumed");

        Ok(ReactivationRecord::Resumed {
            account_id,
            links_reactivated,
        })
    }

    async fn load(&self, account_id: i64) -> Result<Account, CascadeError> {
        self.account_repository
            .find_by_id(account_id)
            .await
            .map_err(CascadeError::Store)?
            .ok_or(CascadeError::AccountNotFound(account_id))
    }

    async fn fan_out(
        &self,
        account_id: i64,
        is_active: bool,
        operation: CascadeOperation,
    ) -> Result<u64, CascadeError> {
        self.link_repository
            .update_by_owner(account_id, LinkPatch::active(is_active))
            .await
            .map_err(|source| {
                tracing::error!(
                    account_id,
                    %operation,
                    error = %source,
                    "Account updated but link fan-out failed"
                );
                CascadeError::PartialCascade {
                    account_id,
                    operation,
                    source,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockAccountRepository, MockLinkRepository};
    use chrono::Duration;
    use serde_json::json;

    fn account(id: i64, deleted_at: Option<DateTime<Utc>>) -> Account {
        Account::new(id, "owner".to_string(), Utc::now(), deleted_at)
    }

    #[tokio::test]
    async fn test_soft_delete_writes_account_then_links() {
        let mut accounts = MockAccountRepository::new();
        let mut links = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();

        accounts
            .expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(Some(account(id, None))));
        accounts
            .expect_update()
            .withf(|id, patch| {
                *id == 3 && matches!(patch.deleted_at, Some(Some(_)))
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id, patch| {
                let mut acc = account(id, None);
                patch.apply(&mut acc);
                Ok(acc)
            });
        links
            .expect_update_by_owner()
            .withf(|owner, patch| *owner == 3 && *patch == LinkPatch::active(false))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(4));

        let service = AccountService::new(Arc::new(accounts), Arc::new(links));
        let record = service.soft_delete(3).await.unwrap();

        assert_eq!(record.account_id, 3);
        assert_eq!(record.links_deactivated, 4);
        assert!(!record.already_deleted);
        assert_eq!(
            record.deletion_deadline,
            record.deleted_at + Duration::days(30)
        );
    }

    #[tokio::test]
    async fn test_soft_delete_of_deleted_account_only_reapplies_fan_out() {
        let deleted_at = Utc::now() - Duration::days(2);
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(move |id| Ok(Some(account(id, Some(deleted_at)))));
        accounts.expect_update().times(0);
        let mut links = MockLinkRepository::new();
        links
            .expect_update_by_owner()
            .times(1)
            .returning(|_, _| Ok(2));

        let service = AccountService::new(Arc::new(accounts), Arc::new(links));
        let record = service.soft_delete(3).await.unwrap();

        assert!(record.already_deleted);
        assert_eq!(record.deleted_at, deleted_at);
    }

    #[tokio::test]
    async fn test_soft_delete_partial_failure_is_reported() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, None))));
        accounts
            .expect_update()
            .times(1)
            .returning(|id, _| Ok(account(id, Some(Utc::now()))));
        let mut links = MockLinkRepository::new();
        links
            .expect_update_by_owner()
            .times(1)
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));

        let service = AccountService::new(Arc::new(accounts), Arc::new(links));
        let result = service.soft_delete(3).await;

        assert!(matches!(
            result,
            Err(CascadeError::PartialCascade {
                account_id: 3,
                operation: CascadeOperation::SoftDelete,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_account_write_failure_skips_fan_out() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, None))));
        accounts
            .expect_update()
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));
        let mut links = MockLinkRepository::new();
        links.expect_update_by_owner().times(0);

        let service = AccountService::new(Arc::new(accounts), Arc::new(links));

        assert!(matches!(
            service.soft_delete(3).await,
            Err(CascadeError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_missing_account() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_id().returning(|_| Ok(None));
        let links = MockLinkRepository::new();

        let service = AccountService::new(Arc::new(accounts), Arc::new(links));

        assert!(matches!(
            service.soft_delete(404).await,
            Err(CascadeError::AccountNotFound(404))
        ));
    }

    #[tokio::test]
    async fn test_reactivate_active_account_mutates_nothing() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, None))));
        accounts.expect_update().times(0);
        let mut links = MockLinkRepository::new();
        links.expect_update_by_owner().times(0);

        let service = AccountService::new(Arc::new(accounts), Arc::new(links));

        assert_eq!(
            service.reactivate(3).await.unwrap(),
            ReactivationRecord::AlreadyActive { account_id: 3 }
        );
    }

    #[tokio::test]
    async fn test_reactivate_clears_deletion_then_restores_links() {
        let mut accounts = MockAccountRepository::new();
        let mut links = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();

        accounts
            .expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(Some(account(id, Some(Utc::now())))));
        accounts
            .expect_update()
            .withf(|_, patch| *patch == AccountPatch::reactivate())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id, _| Ok(account(id, None)));
        links
            .expect_update_by_owner()
            .withf(|_, patch| *patch == LinkPatch::active(true))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(5));

        let service = AccountService::new(Arc::new(accounts), Arc::new(links));

        assert_eq!(
            service.reactivate(3).await.unwrap(),
            ReactivationRecord::Reactivated {
                account_id: 3,
                links_reactivated: 5
            }
        );
    }

    #[tokio::test]
    async fn test_reactivate_partial_failure_is_reported() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, Some(Utc::now())))));
        accounts
            .expect_update()
            .returning(|id, _| Ok(account(id, None)));
        let mut links = MockLinkRepository::new();
        links
            .expect_update_by_owner()
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));

        let service = AccountService::new(Arc::new(accounts), Arc::new(links));

        assert!(matches!(
            service.reactivate(3).await,
            Err(CascadeError::PartialCascade {
                operation: CascadeOperation::Reactivate,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_resume_reactivation_reruns_fan_out_only() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, None))));
        accounts.expect_update().times(0);
        let mut links = MockLinkRepository::new();
        links
            .expect_update_by_owner()
            .withf(|owner, patch| *owner == 3 && *patch == LinkPatch::active(true))
            .times(1)
            .returning(|_, _| Ok(4));

        let service = AccountService::new(Arc::new(accounts), Arc::new(links));

        assert_eq!(
            service.resume_reactivation(3).await.unwrap(),
            ReactivationRecord::Resumed {
                account_id: 3,
                links_reactivated: 4
            }
        );
    }

    #[tokio::test]
    async fn test_resume_reactivation_of_deleted_account_reactivates() {
        let mut accounts = MockAccountRepository::new();
        let mut seq = mockall::Sequence::new();
        accounts
            .expect_find_by_id()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|id| Ok(Some(account(id, Some(Utc::now())))));
        accounts
            .expect_update()
            .withf(|_, patch| *patch == AccountPatch::reactivate())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id, _| Ok(account(id, None)));
        let mut links = MockLinkRepository::new();
        links.expect_update_by_owner().returning(|_, _| Ok(1));

        let service = AccountService::new(Arc::new(accounts), Arc::new(links));

        assert!(matches!(
            service.resume_reactivation(5).await.unwrap(),
            ReactivationRecord::Reactivated { account_id: 5, .. }
        ));
    }

    #[tokio::test]
    async fn test_rename_trims_and_writes_name() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, None))));
        accounts
            .expect_update()
            .withf(|id, patch| *id == 2 && *patch == AccountPatch::rename("Ada Lovelace"))
            .times(1)
            .returning(|id, patch| {
                let mut updated = account(id, None);
                patch.apply(&mut updated);
                Ok(updated)
            });

        let service = AccountService::new(Arc::new(accounts), Arc::new(MockLinkRepository::new()));

        let renamed = service.rename(2, "  Ada Lovelace ").await.unwrap();
        assert_eq!(renamed.name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_rename_rejects_invalid_name_before_store() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_id().times(0);
        accounts.expect_update().times(0);

        let service = AccountService::new(Arc::new(accounts), Arc::new(MockLinkRepository::new()));

        assert!(matches!(
            service.rename(2, "R2D2").await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_rename_deleted_account_is_forbidden() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, Some(Utc::now())))));
        accounts.expect_update().times(0);

        let service = AccountService::new(Arc::new(accounts), Arc::new(MockLinkRepository::new()));

        assert!(matches!(
            service.rename(2, "Grace").await,
            Err(AppError::Forbidden { .. })
        ));
    }
}
