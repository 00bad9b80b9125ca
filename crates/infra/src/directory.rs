//! Directory of known principals.
//!
//! Populated from authenticated requests; the identity provider stays the source
//! of truth for credentials. Backs owner validation and the admin's user picker.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use tracing::instrument;

use projtrack_auth::{Principal, Role};
use projtrack_core::UserId;

use crate::db::map_sqlx_error;
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl From<&Principal> for DirectoryEntry {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id,
            username: p.username.clone(),
            role: p.role,
        }
    }
}

#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Insert or refresh the entry for `principal`.
    async fn record(&self, principal: &Principal) -> Result<(), StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<DirectoryEntry>, StoreError>;

    /// All entries, ordered by username.
    async fn list(&self) -> Result<Vec<DirectoryEntry>, StoreError>;
}

#[async_trait::async_trait]
impl<S> UserDirectory for Arc<S>
where
    S: UserDirectory + ?Sized,
{
    async fn record(&self, principal: &Principal) -> Result<(), StoreError> {
        (**self).record(principal).await
    }

    async fn get(&self, id: UserId) -> Result<Option<DirectoryEntry>, StoreError> {
        (**self).get(id).await
    }

    async fn list(&self) -> Result<Vec<DirectoryEntry>, StoreError> {
        (**self).list().await
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    entries: RwLock<HashMap<UserId, DirectoryEntry>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn record(&self, principal: &Principal) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        entries.insert(principal.id, DirectoryEntry::from(principal));
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<DirectoryEntry>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        Ok(entries.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<DirectoryEntry>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        let mut out: Vec<DirectoryEntry> = entries.values().cloned().collect();
        out.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: Arc<PgPool>,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn entry_from_row(row: &sqlx::postgres::PgRow) -> Result<DirectoryEntry, StoreError> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode_user", e);
    let role: String = row.try_get("role").map_err(decode)?;
    Ok(DirectoryEntry {
        id: UserId::from_uuid(row.try_get("id").map_err(decode)?),
        username: row.try_get("username").map_err(decode)?,
        role: role.parse().map_err(StoreError::Storage)?,
    })
}

#[async_trait::async_trait]
impl UserDirectory for PostgresUserDirectory {
    #[instrument(skip(self, principal), fields(user_id = %principal.id), err)]
    async fn record(&self, principal: &Principal) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, role, last_seen_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (id) DO UPDATE
            SET username = EXCLUDED.username,
                role = EXCLUDED.role,
                last_seen_at = EXCLUDED.last_seen_at
            "#,
        )
        .bind(*principal.id.as_uuid())
        .bind(&principal.username)
        .bind(principal.role.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("record_user", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: UserId) -> Result<Option<DirectoryEntry>, StoreError> {
        let row = sqlx::query("SELECT id, username, role FROM users WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        row.as_ref().map(entry_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<DirectoryEntry>, StoreError> {
        let rows = sqlx::query("SELECT id, username, role FROM users ORDER BY username, id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        rows.iter().map(entry_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_upserts_by_id() {
        let dir = InMemoryUserDirectory::new();
        let id = UserId::new();
        dir.record(&Principal::new(id, "alice", Role::User))
            .await
            .unwrap();
        dir.record(&Principal::new(id, "alice", Role::Admin))
            .await
            .unwrap();

        let entries = dir.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].role, Role::Admin);
        assert_eq!(dir.get(UserId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_is_sorted_by_username() {
        let dir = InMemoryUserDirectory::new();
        for name in ["carol", "alice", "bob"] {
            dir.record(&Principal::new(UserId::new(), name, Role::User))
                .await
                .unwrap();
        }
        let names: Vec<String> = dir
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.username)
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }
}
