//! Notification inbox operations on top of a [`NotificationStore`].

use chrono::Utc;
use tracing::instrument;

use projtrack_core::{NotificationId, UserId};
use projtrack_notifications::{Notification, NotificationDraft, clamp_limit};

use crate::error::StoreError;
use crate::notification_store::NotificationStore;

/// Recipient-facing inbox: badge count, listing, read marking, and delivery of
/// drafts produced by emission planning.
#[derive(Debug, Clone)]
pub struct Inbox<N> {
    store: N,
}

impl<N> Inbox<N>
where
    N: NotificationStore,
{
    pub fn new(store: N) -> Self {
        Self { store }
    }

    #[instrument(skip(self), err)]
    pub async fn unread_count(&self, recipient: UserId) -> Result<u64, StoreError> {
        self.store.count_unread(recipient).await
    }

    /// Newest first; `limit` defaults to and is capped at 100.
    #[instrument(skip(self), err)]
    pub async fn list(
        &self,
        recipient: UserId,
        limit: Option<usize>,
    ) -> Result<Vec<Notification>, StoreError> {
        self.store.list_recent(recipient, clamp_limit(limit)).await
    }

    #[instrument(skip(self), err)]
    pub async fn mark_read(&self, recipient: UserId, id: NotificationId) -> Result<(), StoreError> {
        let found = self.store.mark_read(recipient, id).await?;
        if !found {
            tracing::debug!(%recipient, notification_id = %id, "mark_read matched nothing");
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn mark_all_read(&self, recipient: UserId) -> Result<u64, StoreError> {
        self.store.mark_all_read(recipient).await
    }

    /// Persist every draft. All drafts are attempted; the first failure is returned.
    pub async fn deliver(&self, drafts: Vec<NotificationDraft>) -> Result<usize, StoreError> {
        let mut first_err = None;
        let mut delivered = 0;
        for draft in drafts {
            let recipient = draft.recipient;
            let notification = draft.into_notification(NotificationId::new(), Utc::now());
            match self.store.insert(notification).await {
                Ok(_) => delivered += 1,
                Err(e) => {
                    tracing::warn!(%recipient, error = %e, "notification delivery failed");
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(delivered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification_store::InMemoryNotificationStore;

    #[tokio::test]
    async fn deliver_then_read_flow() {
        let inbox = Inbox::new(InMemoryNotificationStore::new());
        let u = UserId::new();
        let delivered = inbox
            .deliver(vec![
                NotificationDraft::new(u, "one"),
                NotificationDraft::new(u, "two"),
            ])
            .await
            .unwrap();
        assert_eq!(delivered, 2);
        assert_eq!(inbox.unread_count(u).await.unwrap(), 2);

        let listed = inbox.list(u, None).await.unwrap();
        inbox.mark_read(u, listed[0].id).await.unwrap();
        assert_eq!(inbox.unread_count(u).await.unwrap(), 1);

        assert_eq!(inbox.mark_all_read(u).await.unwrap(), 1);
        assert_eq!(inbox.unread_count(u).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_never_exceeds_cap() {
        let inbox = Inbox::new(InMemoryNotificationStore::new());
        let u = UserId::new();
        let drafts = (0..120)
            .map(|i| NotificationDraft::new(u, format!("n{i}")))
            .collect();
        inbox.deliver(drafts).await.unwrap();

        assert_eq!(inbox.list(u, None).await.unwrap().len(), 100);
        assert_eq!(inbox.list(u, Some(500)).await.unwrap().len(), 100);
        assert_eq!(inbox.list(u, Some(7)).await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn marking_a_foreign_notification_is_silent() {
        let inbox = Inbox::new(InMemoryNotificationStore::new());
        let (u, v) = (UserId::new(), UserId::new());
        inbox
            .deliver(vec![NotificationDraft::new(u, "private")])
            .await
            .unwrap();
        let id = inbox.list(u, None).await.unwrap()[0].id;

        inbox.mark_read(v, id).await.unwrap();
        assert_eq!(inbox.unread_count(u).await.unwrap(), 1);
    }
}
