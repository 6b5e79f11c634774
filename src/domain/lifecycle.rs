//! Link and account lifecycle rules.
//!
//! Everything here is a pure function of an entity and a point in time. Nothing
//! mutates storage; callers persist the results through the repositories.
//!
//! # Link states
//!
//! | State          | Condition                                  |
//! |----------------|--------------------------------------------|
//! | `Inactive`     | `is_active == false` (checked first)       |
//! | `Expired`      | whole days until expiry `<= 0`             |
//! | `ExpiringSoon` | whole days until expiry in `1..=3`         |
//! | `Active`       | otherwise                                  |

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::entities::{Account, Link, LinkPatch};

/// A link is `ExpiringSoon` when at most this many days remain.
pub const EXPIRING_SOON_DAYS: i64 = 3;

/// How far a single extend pushes `expires_at`.
pub const EXTENSION_DAYS: i64 = 7;

/// Grace period between soft deletion and permanent purge.
pub const DELETION_GRACE_DAYS: i64 = 30;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Point-in-time classification of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Active,
    ExpiringSoon,
    Expired,
    Inactive,
}

/// Point-in-time classification of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    SoftDeleted {
        deleted_at: DateTime<Utc>,
        /// When the external purge may remove the account. Informational only.
        deletion_deadline: DateTime<Utc>,
    },
}

impl AccountStatus {
    pub fn is_soft_deleted(&self) -> bool {
        matches!(self, AccountStatus::SoftDeleted { .. })
    }
}

/// Whole days until `expires_at`, rounded up.
///
/// One millisecond left counts as one day; zero or negative means expired.
pub fn days_until_expiry(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let remaining = (expires_at - now).num_milliseconds();
    if remaining > 0 {
        (remaining + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    } else {
        // Truncating division rounds toward zero, which is the ceiling here.
        remaining / MILLIS_PER_DAY
    }
}

/// Classifies a link at `now`.
pub fn classify(link: &Link, now: DateTime<Utc>) -> LinkStatus {
    if !link.is_active {
        return LinkStatus::Inactive;
    }

    match days_until_expiry(link.expires_at, now) {
        days if days <= 0 => LinkStatus::Expired,
        days if days <= EXPIRING_SOON_DAYS => LinkStatus::ExpiringSoon,
        _ => LinkStatus::Active,
    }
}

/// Computes the patch that extends a link.
///
/// The new expiry is relative to the current `expires_at`, not to now: a link
/// that is 10 days overdue is still 3 days overdue after one extension.
/// Extending always reactivates the link.
pub fn extend(link: &Link) -> LinkPatch {
    LinkPatch {
        expires_at: Some(link.expires_at + Duration::days(EXTENSION_DAYS)),
        is_active: Some(true),
    }
}

/// Expiry assigned to a link created at `created_at`.
pub fn initial_expiry(created_at: DateTime<Utc>, ttl_days: i64) -> DateTime<Utc> {
    created_at + Duration::days(ttl_days)
}

/// Date after which a soft-deleted account becomes eligible for purge.
pub fn deletion_deadline(deleted_at: DateTime<Utc>) -> DateTime<Utc> {
    deleted_at + Duration::days(DELETION_GRACE_DAYS)
}

/// Classifies an account.
///
/// `now` is accepted for symmetry with [`classify`]; soft deletion does not
/// lapse on its own.
pub fn account_status(account: &Account, _now: DateTime<Utc>) -> AccountStatus {
    match account.deleted_at {
        Some(deleted_at) => AccountStatus::SoftDeleted {
            deleted_at,
            deletion_deadline: deletion_deadline(deleted_at),
        },
        None => AccountStatus::Active,
    }
}
