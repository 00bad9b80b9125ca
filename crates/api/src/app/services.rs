//! Store and service wiring.
//!
//! In-memory stores by default; PostgreSQL when `USE_PERSISTENT_STORES` is set.

use std::sync::Arc;

use sqlx::PgPool;

use projtrack_infra::{
    AppConfig, Inbox, InMemoryNotificationStore, InMemoryProjectStore, InMemoryUserDirectory,
    NotificationStore, PostgresNotificationStore, PostgresProjectStore, PostgresUserDirectory,
    ProjectService, ProjectStore, UserDirectory, db,
};

pub type DynProjectService =
    ProjectService<Arc<dyn ProjectStore>, Arc<dyn NotificationStore>, Arc<dyn UserDirectory>>;

/// Everything handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub projects: DynProjectService,
    directory: Arc<dyn UserDirectory>,
}

impl AppServices {
    fn from_stores(
        projects: Arc<dyn ProjectStore>,
        notifications: Arc<dyn NotificationStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            projects: ProjectService::new(projects, notifications, directory.clone()),
            directory,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_stores(
            Arc::new(InMemoryProjectStore::new()),
            Arc::new(InMemoryNotificationStore::new()),
            Arc::new(InMemoryUserDirectory::new()),
        )
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::from_stores(
            Arc::new(PostgresProjectStore::new(pool.clone())),
            Arc::new(PostgresNotificationStore::new(pool.clone())),
            Arc::new(PostgresUserDirectory::new(pool)),
        )
    }

    pub fn inbox(&self) -> &Inbox<Arc<dyn NotificationStore>> {
        self.projects.inbox()
    }

    pub fn directory(&self) -> Arc<dyn UserDirectory> {
        self.directory.clone()
    }
}

/// Build services per configuration. Persistent mode connects and applies the schema.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    if !config.use_persistent_stores {
        tracing::info!("using in-memory stores");
        return Ok(AppServices::in_memory());
    }

    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set for persistent stores"))?;
    let pool = db::connect(url, 10).await?;
    db::migrate(&pool).await?;
    tracing::info!("using postgres stores");
    Ok(AppServices::postgres(pool))
}
