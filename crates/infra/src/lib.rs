//! Infrastructure layer: stores, services, configuration.
//!
//! Every store is a trait with an in-memory implementation (tests/dev) and a
//! PostgreSQL implementation. Services compose stores and own the orchestration:
//! authorize, mutate, then emit notifications.

pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod inbox;
pub mod notification_store;
pub mod project_service;
pub mod project_store;

pub use config::{AppConfig, ConfigError, LogFormat};
pub use directory::{DirectoryEntry, InMemoryUserDirectory, PostgresUserDirectory, UserDirectory};
pub use error::{ServiceError, StoreError};
pub use inbox::Inbox;
pub use notification_store::{InMemoryNotificationStore, NotificationStore, PostgresNotificationStore};
pub use project_service::{CreatedProject, ProjectService, RemovedModule};
pub use project_store::{InMemoryProjectStore, PostgresProjectStore, ProjectStore, ProjectUpdate};
