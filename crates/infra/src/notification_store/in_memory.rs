use std::collections::HashMap;
use std::sync::RwLock;

use projtrack_core::{NotificationId, UserId};
use projtrack_notifications::Notification;

use super::r#trait::NotificationStore;
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Mailbox {
    entries: Vec<Notification>,
    unread: u64,
}

/// In-memory notification store.
///
/// Intended for tests/dev. One mailbox per recipient; the unread counter is kept
/// alongside so the badge count never scans.
#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    mailboxes: RwLock<HashMap<UserId, Mailbox>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, notification: Notification) -> Result<Notification, StoreError> {
        let mut mailboxes = self
            .mailboxes
            .write()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        let mailbox = mailboxes.entry(notification.recipient).or_default();
        if mailbox.entries.iter().any(|n| n.id == notification.id) {
            return Err(StoreError::Conflict(format!(
                "notification {} already exists",
                notification.id
            )));
        }
        if !notification.read {
            mailbox.unread += 1;
        }
        mailbox.entries.push(notification.clone());
        Ok(notification)
    }

    async fn count_unread(&self, recipient: UserId) -> Result<u64, StoreError> {
        let mailboxes = self
            .mailboxes
            .read()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        Ok(mailboxes.get(&recipient).map(|m| m.unread).unwrap_or(0))
    }

    async fn list_recent(
        &self,
        recipient: UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, StoreError> {
        let mailboxes = self
            .mailboxes
            .read()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        let Some(mailbox) = mailboxes.get(&recipient) else {
            return Ok(Vec::new());
        };
        let mut out = mailbox.entries.clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        out.truncate(limit);
        Ok(out)
    }

    async fn mark_read(&self, recipient: UserId, id: NotificationId) -> Result<bool, StoreError> {
        let mut mailboxes = self
            .mailboxes
            .write()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        let Some(mailbox) = mailboxes.get_mut(&recipient) else {
            return Ok(false);
        };
        let Some(entry) = mailbox.entries.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };
        if !entry.read {
            entry.read = true;
            mailbox.unread = mailbox.unread.saturating_sub(1);
        }
        Ok(true)
    }

    async fn mark_all_read(&self, recipient: UserId) -> Result<u64, StoreError> {
        let mut mailboxes = self
            .mailboxes
            .write()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        let Some(mailbox) = mailboxes.get_mut(&recipient) else {
            return Ok(0);
        };
        let changed = mailbox.unread;
        mailbox.entries.iter_mut().for_each(|n| n.read = true);
        mailbox.unread = 0;
        Ok(changed)
    }
}
