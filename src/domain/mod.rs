//! Domain layer containing business entities and rules.
//!
//! This module is independent of infrastructure and presentation concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`lifecycle`] - Pure link/account state classification and transitions
//!
//! # Design Principles
//!
//! - Repository traits define contracts implemented by the infrastructure layer
//! - Lifecycle rules are pure functions over a point in time
//! - Orchestration lives in [`crate::application::services`]

pub mod entities;
pub mod lifecycle;
pub mod repositories;
