//! Link entity representing a slug → destination mapping.

use chrono::{DateTime, Utc};

/// A short link owned by an account.
///
/// `owner_id` is a back-reference to the creating account. The link row lives
/// independently of the account row and is only destroyed by an explicit delete.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: i64,
    pub slug: String,
    pub original_url: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        slug: String,
        original_url: String,
        owner_id: i64,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            slug,
            original_url,
            owner_id,
            created_at,
            expires_at,
            is_active,
        }
    }

    /// Returns true if `account_id` created this link.
    pub fn is_owned_by(&self, account_id: i64) -> bool {
        self.owner_id == account_id
    }
}

/// Input data for inserting a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub slug: String,
    pub original_url: String,
    pub owner_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Partial update for one or many links.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPatch {
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl LinkPatch {
    /// Patch that only toggles `is_active`.
    pub fn active(is_active: bool) -> Self {
        Self {
            expires_at: None,
            is_active: Some(is_active),
        }
    }

    /// Applies the patch to a link in place.
    pub fn apply(&self, link: &mut Link) {
        if let Some(expires_at) = self.expires_at {
            link.expires_at = expires_at;
        }
        if let Some(is_active) = self.is_active {
            link.is_active = is_active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_link() -> Link {
        let now = Utc::now();
        Link::new(
            1,
            "abc123".to_string(),
            "https://example.com".to_string(),
            42,
            now,
            now + Duration::days(30),
            true,
        )
    }

    #[test]
    fn test_link_creation() {
        let link = sample_link();

        assert_eq!(link.id, 1);
        assert_eq!(link.slug, "abc123");
        assert_eq!(link.original_url, "https://example.com");
        assert!(link.is_active);
        assert!(link.expires_at > link.created_at);
    }

    #[test]
    fn test_link_ownership() {
        let link = sample_link();
        assert!(link.is_owned_by(42));
        assert!(!link.is_owned_by(43));
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut link = sample_link();
        let original_expiry = link.expires_at;

        LinkPatch::active(false).apply(&mut link);

        assert!(!link.is_active);
        assert_eq!(link.expires_at, original_expiry);
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut link = sample_link();
        let before = link.clone();

        LinkPatch::default().apply(&mut link);

        assert_eq!(link, before);
    }
}
