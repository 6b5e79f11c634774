//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the store. Concrete implementations live in
//! `crate::infrastructure`; mock implementations are generated via `mockall`
//! for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Link records keyed by id and unique slug
//! - [`AccountRepository`] - Account soft-deletion state
//! - [`TokenRepository`] - API token authentication

pub mod account_repository;
pub mod link_repository;
pub mod token_repository;

pub use account_repository::AccountRepository;
pub use link_repository::LinkRepository;
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use account_repository::MockAccountRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
