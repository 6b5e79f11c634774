//! Business logic services for the application layer.

pub mod account_service;
pub mod auth_service;
pub mod link_service;
pub mod resolution_service;
pub mod slug_allocator;

pub use account_service::AccountService;
pub use auth_service::{AuthService, Caller};
pub use link_service::LinkService;
pub use resolution_service::{Resolution, ResolutionService};
pub use slug_allocator::SlugAllocator;
