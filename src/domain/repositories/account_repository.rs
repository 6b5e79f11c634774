//! Repository trait for account storage.

use crate::domain::entities::{Account, AccountPatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for accounts.
///
/// Only the lifecycle-relevant columns are managed here. Credentials and
/// profile data belong to the external auth provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Creates an active account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, name: &str) -> Result<Account, AppError>;

    /// Finds an account by id, including soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError>;

    /// Lists all accounts ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self) -> Result<Vec<Account>, AppError>;

    /// Partially updates an account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the account does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, id: i64, patch: AccountPatch) -> Result<Account, AppError>;
}
