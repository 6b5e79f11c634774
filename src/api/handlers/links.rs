//! Handlers for link management endpoints (create, list, extend, delete).

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, LinkListResponse, LinkResponse};
use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::application::services::Caller;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link owned by the caller.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/landing",
///   "custom_slug": "spring-sale"   // optional
/// }
/// ```
///
/// # Errors
///
/// - 400 for a bad URL, malformed or reserved slug (`details.kind` says which)
/// - 403 if the caller's account is soft-deleted
/// - 409 if the slug is taken, including by a concurrent request
/// - 503 if no random slug could be allocated
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_link(
            caller.account_id,
            &payload.url,
            payload.custom_slug.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, &state.base_url, Utc::now())),
    ))
}

/// Lists the caller's active, unexpired links, newest first.
///
/// # Endpoint
///
/// `GET /api/links?page=1&page_size=10`
///
/// Each item carries its lifecycle `status` and `days_until_expiry`.
///
/// # Errors
///
/// Returns 400 Bad Request if pagination parameters are invalid.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let (offset, limit) = params
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let now = Utc::now();
    let page = state
        .link_service
        .list_links(caller.account_id, now, limit, offset)
        .await?;

    let items = page
        .links
        .into_iter()
        .map(|link| LinkResponse::from_link(link, &state.base_url, now))
        .collect();

    Ok(Json(LinkListResponse {
        pagination: PaginationMeta::new(params.page(), params.page_size(), page.total),
        items,
    }))
}

/// Extends a link's expiry by seven days and reactivates it.
///
/// # Endpoint
///
/// `POST /api/links/{id}/extend`
///
/// The new expiry is computed from the current `expires_at`, not from now,
/// so an overdue link may still be expired afterwards.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or belongs to someone else.
pub async fn extend_link_handler(
    Path(link_id): Path<i64>,
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state
        .link_service
        .extend_link(caller.account_id, link_id)
        .await?;

    Ok(Json(LinkResponse::from_link(link, &state.base_url, Utc::now())))
}

/// Permanently deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/links/{id}`
///
/// # Errors
///
/// - 404 if the link doesn't exist
/// - 403 if it belongs to another account
pub async fn delete_link_handler(
    Path(link_id): Path<i64>,
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<StatusCode, AppError> {
    state
        .link_service
        .delete_link(caller.account_id, link_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
