//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Link`] - A slug mapped to a destination URL, owned by an account
//! - [`Account`] - A link owner that can be soft-deleted and reactivated
//!
//! # Design Pattern
//!
//! Entities come with separate structs for creation and partial updates:
//! - `NewLink` - For inserting new records
//! - `LinkPatch`, `AccountPatch` - For partial updates

pub mod account;
pub mod link;

pub use account::{Account, AccountPatch};
pub use link::{Link, LinkPatch, NewLink};
