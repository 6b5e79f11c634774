//! Account entity and its soft-deletion state.

use chrono::{DateTime, Utc};

/// A user account that owns links.
///
/// Soft deletion is represented solely by `deleted_at`; [`Account::is_deleted`]
/// is derived from it so the two can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Creates a new Account instance.
    pub fn new(
        id: i64,
        name: String,
        created_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            name,
            created_at,
            deleted_at,
        }
    }

    /// Returns true if the account has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Partial update for an account.
///
/// `deleted_at: None` leaves the field unchanged, `Some(None)` clears it
/// (reactivation) and `Some(Some(t))` marks the account deleted at `t`.
/// `name: None` keeps the current name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

impl AccountPatch {
    pub fn soft_delete(at: DateTime<Utc>) -> Self {
        Self {
            deleted_at: Some(Some(at)),
            ..Self::default()
        }
    }

    pub fn reactivate() -> Self {
        Self {
            deleted_at: Some(None),
            ..Self::default()
        }
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Applies the patch to an account in place.
    pub fn apply(&self, account: &mut Account) {
        if let Some(name) = &self.name {
            account.name = name.clone();
        }
        if let Some(deleted_at) = self.deleted_at {
            account.deleted_at = deleted_at;
        }
    }
}
