//! Notification persistence, always scoped by recipient.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryNotificationStore;
pub use postgres::PostgresNotificationStore;
pub use r#trait::NotificationStore;
