//! Utility functions shared across layers.
//!
//! - [`slug`] - Slug policy, reserved namespace and random generation
//! - [`destination_url`] - Destination URL validation
//! - [`display_name`] - Account display name validation
//! - [`db_error`] - Database error classification

pub mod db_error;
pub mod destination_url;
pub mod display_name;
pub mod slug;
