//! Handlers for the caller's own account.

use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::api::dto::account::{AccountResponse, UpdateAccountRequest};
use crate::application::services::Caller;
use crate::application::services::account_service::{DeletionRecord, ReactivationRecord};
use crate::domain::lifecycle;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the caller's account status.
///
/// # Endpoint
///
/// `GET /api/account`
///
/// Soft-deleted accounts can still call this; `deletion_deadline` tells them
/// how long they have to reactivate.
pub async fn account_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<AccountResponse>, AppError> {
    let (account, status) = state
        .account_service
        .status(caller.account_id, Utc::now())
        .await?;

    Ok(Json(AccountResponse::new(account, status)))
}

/// Renames the caller's account.
///
/// # Endpoint
///
/// `PATCH /api/account` with `{"name": "Ada Lovelace"}`
///
/// # Errors
///
/// - 400 if the name is blank, outside 2-50 characters or contains digits
/// - 403 if the account is soft-deleted
pub async fn update_account_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state
        .account_service
        .rename(caller.account_id, &payload.name)
        .await?;
    let status = lifecycle::account_status(&account, Utc::now());

    Ok(Json(AccountResponse::new(account, status)))
}

/// Soft-deletes the caller's account and deactivates all of its links.
///
/// # Endpoint
///
/// `DELETE /api/account`
///
/// Repeating the call keeps the original deletion time and re-applies link
/// deactivation.
///
/// # Errors
///
/// Returns 500 `partial_cascade` if the account was marked deleted but its
/// links could not be deactivated. Retrying the request completes it.
pub async fn delete_account_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<DeletionRecord>, AppError> {
    let record = state.account_service.soft_delete(caller.account_id).await?;
    Ok(Json(record))
}

/// Reactivates the caller's account and its links.
///
/// # Endpoint
///
/// `POST /api/account/reactivate`
///
/// Returns `{"status": "already_active"}` without side effects when the
/// account is not deleted. Link expiry dates are left untouched.
pub async fn reactivate_account_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<ReactivationRecord>, AppError> {
    let record = state.account_service.reactivate(caller.account_id).await?;
    Ok(Json(record))
}

/// Completes a reactivation whose link update failed.
///
/// # Endpoint
///
/// `POST /api/account/reactivate/resume`
///
/// Re-runs the link reactivation for an account that is already active and
/// returns `{"status": "resumed", "links_reactivated": n}`. A soft-deleted
/// account is reactivated in full instead.
pub async fn resume_reactivation_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<ReactivationRecord>, AppError> {
    let record = state
        .account_service
        .resume_reactivation(caller.account_id)
        .await?;
    Ok(Json(record))
}
