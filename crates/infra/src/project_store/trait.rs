use std::sync::Arc;

use chrono::{DateTime, Utc};

use projtrack_core::{ProjectId, UserId};
use projtrack_projects::{ModuleId, ModuleName, Project, ProjectFields};

use crate::error::StoreError;

/// Outcome of a field update: the stored project plus who owned it before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub project: Project,
    pub previous_owner: UserId,
}

/// Durable project storage.
///
/// Lookups return `Ok(None)` for missing projects; mutations of a missing project
/// fail with `StoreError::NotFound("project")`, and of a missing module with
/// `StoreError::NotFound("module")`.
#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get(&self, id: ProjectId) -> Result<Option<Project>, StoreError>;

    /// Projects owned by `owner`, or all projects when `owner` is `None`.
    ///
    /// Ordered by start date ascending; projects without a start date first,
    /// ties broken by creation time.
    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Project>, StoreError>;

    /// Insert a new project. `StoreError::Conflict` if the external id is taken.
    async fn insert(&self, project: Project) -> Result<Project, StoreError>;

    /// Overwrite the editable fields and, when `new_owner` is given, the owner.
    async fn update_fields(
        &self,
        id: ProjectId,
        fields: ProjectFields,
        new_owner: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<ProjectUpdate, StoreError>;

    /// Delete a project together with its modules; returns what was removed.
    async fn delete(&self, id: ProjectId) -> Result<Project, StoreError>;

    /// Append a module and increment `module_count` atomically.
    async fn push_module(
        &self,
        id: ProjectId,
        name: ModuleName,
        assigned_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError>;

    /// Flip `done` on one module.
    async fn toggle_module(
        &self,
        id: ProjectId,
        module: ModuleId,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError>;

    /// Remove one module and decrement `module_count` (floored at 0) atomically.
    async fn remove_module(
        &self,
        id: ProjectId,
        module: ModuleId,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError>;
}

#[async_trait::async_trait]
impl<S> ProjectStore for Arc<S>
where
    S: ProjectStore + ?Sized,
{
    async fn get(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        (**self).get(id).await
    }

    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Project>, StoreError> {
        (**self).list(owner).await
    }

    async fn insert(&self, project: Project) -> Result<Project, StoreError> {
        (**self).insert(project).await
    }

    async fn update_fields(
        &self,
        id: ProjectId,
        fields: ProjectFields,
        new_owner: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<ProjectUpdate, StoreError> {
        (**self).update_fields(id, fields, new_owner, now).await
    }

    async fn delete(&self, id: ProjectId) -> Result<Project, StoreError> {
        (**self).delete(id).await
    }

    async fn push_module(
        &self,
        id: ProjectId,
        name: ModuleName,
        assigned_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError> {
        (**self).push_module(id, name, assigned_by, now).await
    }

    async fn toggle_module(
        &self,
        id: ProjectId,
        module: ModuleId,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError> {
        (**self).toggle_module(id, module, now).await
    }

    async fn remove_module(
        &self,
        id: ProjectId,
        module: ModuleId,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError> {
        (**self).remove_module(id, module, now).await
    }
}
