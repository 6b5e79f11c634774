//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::application::services::Resolution;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a slug to its original URL.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// # Response Codes
///
/// - **307 Temporary Redirect**: link exists and its owner is active
/// - **404 Not Found**: unknown slug, or the owning account is missing or
///   soft-deleted. The body is identical in every case.
/// - **500 Internal Server Error**: the store failed
///
/// The slug is looked up exactly as given. No normalization is applied on the
/// read path.
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    match state.resolution_service.resolve(&slug).await? {
        Resolution::Redirect(url) => Ok(Redirect::temporary(&url).into_response()),
        Resolution::NotFound => Err(AppError::not_found("Link not found", json!({}))),
    }
}
