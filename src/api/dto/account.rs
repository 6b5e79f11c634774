//! DTOs for account endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Account;
use crate::domain::lifecycle::AccountStatus;

/// Request body for `PATCH /api/account`.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: String,
}

/// Account state as seen by its owner.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub status: &'static str,
    pub deleted_at: Option<DateTime<Utc>>,
    /// When a soft-deleted account becomes eligible for purge.
    pub deletion_deadline: Option<DateTime<Utc>>,
}

impl AccountResponse {
    pub fn new(account: Account, status: AccountStatus) -> Self {
        let (label, deleted_at, deletion_deadline) = match status {
            AccountStatus::Active => ("active", None, None),
            AccountStatus::SoftDeleted {
                deleted_at,
                deletion_deadline,
            } => ("soft_deleted", Some(deleted_at), Some(deletion_deadline)),
        };

        Self {
            id: account.id,
            name: account.name,
            created_at: account.created_at,
            status: label,
            deleted_at,
            deletion_deadline,
        }
    }
}
