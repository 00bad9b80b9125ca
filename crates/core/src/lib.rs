//! `projtrack-core`: shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no storage or transport concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{NotificationId, ProjectId, UserId};
