//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod account;
pub mod health;
pub mod links;
pub mod redirect;

pub use account::{
    account_handler, delete_account_handler, reactivate_account_handler,
    resume_reactivation_handler, update_account_handler,
};
pub use health::health_handler;
pub use links::{create_link_handler, delete_link_handler, extend_link_handler, list_links_handler};
pub use redirect::redirect_handler;
