//! Slug allocation with candidate-then-commit semantics.
//!
//! [`SlugAllocator::allocate`] picks a candidate and pre-checks it against the
//! reserved namespace and the live link table. The pre-check is only an
//! optimization: two concurrent requests can both pass it. The store's unique
//! constraint on `slug` is the final arbiter, and [`SlugAllocator::commit`]
//! turns a constraint violation into [`AllocationError::SlugTaken`].

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::slug::{SlugFormatError, generate_slug, is_reserved, validate_slug};

/// Maximum random candidates tried before giving up.
pub const MAX_RANDOM_ATTEMPTS: usize = 10;

/// Reasons a slug could not be allocated.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("invalid slug format: {0}")]
    InvalidFormat(#[from] SlugFormatError),

    #[error("slug '{0}' is reserved")]
    ReservedSlug(String),

    #[error("slug '{0}' is already taken")]
    SlugTaken(String),

    #[error("no free slug found after {attempts} attempts")]
    AllocationExhausted { attempts: usize },

    #[error(transparent)]
    Store(#[from] AppError),
}

/// Where a candidate slug came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugOrigin {
    Custom,
    Random,
}

/// A slug that passed the pre-checks but is not persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCandidate {
    slug: String,
    origin: SlugOrigin,
}

impl SlugCandidate {
    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn origin(&self) -> SlugOrigin {
        self.origin
    }
}

/// Everything needed to insert a link except its slug.
#[derive(Debug, Clone)]
pub struct LinkDraft {
    pub original_url: String,
    pub owner_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Allocates unique slugs against the live link table.
pub struct SlugAllocator<L: ?Sized> {
    link_repository: Arc<L>,
}

impl<L: LinkRepository + ?Sized> SlugAllocator<L> {
    /// Creates a new allocator.
    pub fn new(link_repository: Arc<L>) -> Self {
        Self { link_repository }
    }

    /// Chooses a candidate slug.
    ///
    /// A custom value that is blank after trimming is treated as absent and a
    /// random slug is generated instead.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::InvalidFormat`] if a custom slug breaks the policy
    /// - [`AllocationError::ReservedSlug`] if it is reserved (checked before the store)
    /// - [`AllocationError::SlugTaken`] if a link already uses it
    /// - [`AllocationError::AllocationExhausted`] if every random attempt collided
    /// - [`AllocationError::Store`] on store failures
    pub async fn allocate(&self, custom: Option<&str>) -> Result<SlugCandidate, AllocationError> {
        match custom.filter(|c| !c.trim().is_empty()) {
            Some(custom) => self.allocate_custom(custom).await,
            None => self.allocate_random().await,
        }
    }

    /// Inserts a link under the candidate slug.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::SlugTaken`] if another writer committed the
    /// same slug after the pre-check. Other store errors are passed through.
    pub async fn commit(
        &self,
        candidate: SlugCandidate,
        draft: LinkDraft,
    ) -> Result<Link, AllocationError> {
        let new_link = NewLink {
            slug: candidate.slug.clone(),
            original_url: draft.original_url,
            owner_id: draft.owner_id,
            expires_at: draft.expires_at,
        };

        match self.link_repository.create(new_link).await {
            Ok(link) => Ok(link),
            Err(AppError::Conflict { .. }) => {
                tracing::info!(
                    slug = %candidate.slug,
                    origin = ?candidate.origin,
                    "Slug claimed by a concurrent writer"
                );
                Err(AllocationError::SlugTaken(candidate.slug))
            }
            Err(e) => Err(AllocationError::Store(e)),
        }
    }

    async fn allocate_custom(&self, raw: &str) -> Result<SlugCandidate, AllocationError> {
        let slug = validate_slug(raw)?;

        if is_reserved(&slug) {
            return Err(AllocationError::ReservedSlug(slug));
        }

        if self.link_repository.find_by_slug(&slug).await?.is_some() {
            return Err(AllocationError::SlugTaken(slug));
        }

        Ok(SlugCandidate {
            slug,
            origin: SlugOrigin::Custom,
        })
    }

    async fn allocate_random(&self) -> Result<SlugCandidate, AllocationError> {
        for attempt in 1..=MAX_RANDOM_ATTEMPTS {
            let slug = generate_slug();

            if is_reserved(&slug) {
                continue;
            }

            if self.link_repository.find_by_slug(&slug).await?.is_none() {
                return Ok(SlugCandidate {
                    slug,
                    origin: SlugOrigin::Random,
                });
            }

            tracing::debug!(attempt, "Random slug collided");
        }

        tracing::warn!(
            attempts = MAX_RANDOM_ATTEMPTS,
            "Random slug allocation exhausted"
        );
        Err(AllocationError::AllocationExhausted {
            attempts: MAX_RANDOM_ATTEMPTS,
        })
    }
}
