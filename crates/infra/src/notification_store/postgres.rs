//! Postgres-backed notification store.
//!
//! Every statement filters on `recipient_id`, so cross-user reads and writes
//! cannot be expressed through this type.

use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{Span, instrument};

use projtrack_core::{NotificationId, UserId};
use projtrack_notifications::Notification;

use super::r#trait::NotificationStore;
use crate::db::map_sqlx_error;
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct PostgresNotificationStore {
    pool: Arc<PgPool>,
}

impl PostgresNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn notification_from_row(row: &PgRow) -> Result<Notification, sqlx::Error> {
    Ok(Notification {
        id: NotificationId::from_uuid(row.try_get("id")?),
        recipient: UserId::from_uuid(row.try_get("recipient_id")?),
        message: row.try_get("message")?,
        read: row.try_get("read")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait::async_trait]
impl NotificationStore for PostgresNotificationStore {
    #[instrument(skip(self, notification), fields(recipient = %notification.recipient), err)]
    async fn insert(&self, notification: Notification) -> Result<Notification, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient_id, message, read, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*notification.id.as_uuid())
        .bind(*notification.recipient.as_uuid())
        .bind(&notification.message)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_notification", e))?;
        Ok(notification)
    }

    #[instrument(skip(self), err)]
    async fn count_unread(&self, recipient: UserId) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND NOT read",
        )
        .bind(*recipient.as_uuid())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_unread", e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    #[instrument(skip(self), fields(result_count = tracing::field::Empty), err)]
    async fn list_recent(
        &self,
        recipient: UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, recipient_id, message, read, created_at
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(*recipient.as_uuid())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_notifications", e))?;

        let out = rows
            .iter()
            .map(notification_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_notifications", e))?;
        Span::current().record("result_count", out.len());
        Ok(out)
    }

    #[instrument(skip(self), fields(notification_id = %id), err)]
    async fn mark_read(&self, recipient: UserId, id: NotificationId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND recipient_id = $2",
        )
        .bind(*id.as_uuid())
        .bind(*recipient.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("mark_read", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn mark_all_read(&self, recipient: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE recipient_id = $1 AND NOT read",
        )
        .bind(*recipient.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("mark_all_read", e))?;
        Ok(result.rows_affected())
    }
}
