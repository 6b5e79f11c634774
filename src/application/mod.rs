//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and lifecycle rules. Services consume repository traits and
//! provide a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::slug_allocator::SlugAllocator`] - Custom and random slug allocation
//! - [`services::link_service::LinkService`] - Owner-scoped link management
//! - [`services::resolution_service::ResolutionService`] - Public slug resolution
//! - [`services::account_service::AccountService`] - Soft-delete and reactivation cascade
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
