use std::sync::Arc;

use projtrack_core::{NotificationId, UserId};
use projtrack_notifications::Notification;

use crate::error::StoreError;

/// Recipient-scoped notification storage.
///
/// Every read and write names the recipient; a notification belonging to
/// someone else is indistinguishable from one that does not exist.
#[async_trait::async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: Notification) -> Result<Notification, StoreError>;

    async fn count_unread(&self, recipient: UserId) -> Result<u64, StoreError>;

    /// Newest first, ties broken by id descending, at most `limit` entries.
    async fn list_recent(
        &self,
        recipient: UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, StoreError>;

    /// Mark one notification read. Returns whether a matching notification of
    /// `recipient` existed; missing or foreign ids are a silent no-op.
    async fn mark_read(&self, recipient: UserId, id: NotificationId) -> Result<bool, StoreError>;

    /// Mark all of `recipient`'s notifications read; returns how many changed.
    async fn mark_all_read(&self, recipient: UserId) -> Result<u64, StoreError>;
}

#[async_trait::async_trait]
impl<S> NotificationStore for Arc<S>
where
    S: NotificationStore + ?Sized,
{
    async fn insert(&self, notification: Notification) -> Result<Notification, StoreError> {
        (**self).insert(notification).await
    }

    async fn count_unread(&self, recipient: UserId) -> Result<u64, StoreError> {
        (**self).count_unread(recipient).await
    }

    async fn list_recent(
        &self,
        recipient: UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, StoreError> {
        (**self).list_recent(recipient, limit).await
    }

    async fn mark_read(&self, recipient: UserId, id: NotificationId) -> Result<bool, StoreError> {
        (**self).mark_read(recipient, id).await
    }

    async fn mark_all_read(&self, recipient: UserId) -> Result<u64, StoreError> {
        (**self).mark_all_read(recipient).await
    }
}
