//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx with
//! runtime-bound queries, so the crate builds without a live database.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage, owner fan-out updates
//! - [`PgAccountRepository`] - Account soft-deletion state
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_account_repository;
pub mod pg_link_repository;
pub mod pg_token_repository;

pub use pg_account_repository::PgAccountRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_token_repository::PgTokenRepository;
