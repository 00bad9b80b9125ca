use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use projtrack_core::{NotificationId, UserId};

/// Default page size for inbox listings.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Hard cap for inbox listings.
pub const MAX_LIST_LIMIT: usize = 100;

/// A durable, recipient-scoped inbox entry.
///
/// Append-only: after creation only `read` ever changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification decided on but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationDraft {
    pub recipient: UserId,
    pub message: String,
}

impl NotificationDraft {
    pub fn new(recipient: UserId, message: impl Into<String>) -> Self {
        Self {
            recipient,
            message: message.into(),
        }
    }

    pub fn into_notification(self, id: NotificationId, now: DateTime<Utc>) -> Notification {
        Notification {
            id,
            recipient: self.recipient,
            message: self.message,
            read: false,
            created_at: now,
        }
    }
}

/// Resolve a requested page size: default when absent, never above the cap.
pub fn clamp_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .min(MAX_LIST_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_caps() {
        assert_eq!(clamp_limit(None), 100);
        assert_eq!(clamp_limit(Some(10)), 10);
        assert_eq!(clamp_limit(Some(5_000)), 100);
        assert_eq!(clamp_limit(Some(0)), 0);
    }

    #[test]
    fn draft_becomes_unread_notification() {
        let recipient = UserId::new();
        let n = NotificationDraft::new(recipient, "hello")
            .into_notification(NotificationId::new(), Utc::now());
        assert_eq!(n.recipient, recipient);
        assert_eq!(n.message, "hello");
        assert!(!n.read);
    }
}
