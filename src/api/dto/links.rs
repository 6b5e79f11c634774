//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::dto::pagination::PaginationMeta;
use crate::domain::entities::Link;
use crate::domain::lifecycle::{self, LinkStatus};

/// Request body for `POST /api/links`.
///
/// Slug policy (length, characters, reserved words) is enforced by the slug
/// allocator so clients get a specific reason back.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Optional custom slug. Blank means "generate one".
    pub custom_slug: Option<String>,
}

/// JSON representation of a link with its lifecycle state.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub slug: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub status: LinkStatus,
    pub days_until_expiry: i64,
}

impl LinkResponse {
    pub fn from_link(link: Link, base_url: &str, now: DateTime<Utc>) -> Self {
        let status = lifecycle::classify(&link, now);
        let days_until_expiry = lifecycle::days_until_expiry(link.expires_at, now);
        let short_url = format!("{}/{}", base_url.trim_end_matches('/'), link.slug);

        Self {
            id: link.id,
            slug: link.slug,
            short_url,
            original_url: link.original_url,
            created_at: link.created_at,
            expires_at: link.expires_at,
            is_active: link.is_active,
            status,
            days_until_expiry,
        }
    }
}

/// Paginated list of the caller's links.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<LinkResponse>,
}
