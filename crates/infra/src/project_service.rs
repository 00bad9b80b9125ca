//! Project operations as seen by an authenticated principal.
//!
//! Every project-scoped operation follows the same shape:
//! 1. Load the project and authorize the principal against it
//! 2. Perform the mutation through the store (atomic per call)
//! 3. Plan and deliver notifications (best effort)
//!
//! Module operations take a positional index from the caller. The index is
//! resolved to the module's stable id on the authorized snapshot, and the store
//! mutates by id; a module removed in between yields `NotFound`.

use chrono::Utc;
use tracing::instrument;

use projtrack_auth::{Principal, authorize, explain_authorization};
use projtrack_core::{ProjectId, UserId};
use projtrack_notifications::plan;
use projtrack_projects::{
    Module, ModuleName, Project, ProjectChange, ProjectInput, effective_owner, reassignment_target,
};

use crate::directory::UserDirectory;
use crate::error::ServiceError;
use crate::inbox::Inbox;
use crate::notification_store::NotificationStore;
use crate::project_store::ProjectStore;

/// Result of [`ProjectService::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedProject {
    pub project: Project,
    /// True when an admin attributed the project to someone else.
    pub assigned_to_other: bool,
}

/// Result of [`ProjectService::delete_module`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedModule {
    pub project: Project,
    pub module: Module,
}

#[derive(Debug, Clone)]
pub struct ProjectService<P, N, D> {
    projects: P,
    inbox: Inbox<N>,
    directory: D,
}

impl<P, N, D> ProjectService<P, N, D>
where
    P: ProjectStore,
    N: NotificationStore,
    D: UserDirectory,
{
    pub fn new(projects: P, notifications: N, directory: D) -> Self {
        Self {
            projects,
            inbox: Inbox::new(notifications),
            directory,
        }
    }

    pub fn inbox(&self) -> &Inbox<N> {
        &self.inbox
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Admins see every project, users only their own.
    #[instrument(skip(self, actor), fields(principal_id = %actor.id), err)]
    pub async fn list_visible(&self, actor: &Principal) -> Result<Vec<Project>, ServiceError> {
        let owner = if actor.is_admin() { None } else { Some(actor.id) };
        Ok(self.projects.list(owner).await?)
    }

    #[instrument(skip(self, actor), fields(principal_id = %actor.id), err)]
    pub async fn get(&self, actor: &Principal, id: ProjectId) -> Result<Project, ServiceError> {
        self.authorized(actor, id).await
    }

    #[instrument(skip(self, actor, input), fields(principal_id = %actor.id), err)]
    pub async fn create(
        &self,
        actor: &Principal,
        input: ProjectInput,
        requested_owner: Option<UserId>,
    ) -> Result<CreatedProject, ServiceError> {
        let new = input.into_new_project()?;
        let owner = effective_owner(actor, requested_owner);
        if owner != actor.id {
            self.ensure_known_user(owner).await?;
        }

        let project = self
            .projects
            .insert(Project::new(ProjectId::new(), new, owner, Utc::now()))
            .await?;

        self.emit(
            actor,
            ProjectChange::Created {
                external_id: project.external_id.clone(),
                owner,
            },
        )
        .await;

        Ok(CreatedProject {
            assigned_to_other: owner != actor.id,
            project,
        })
    }

    /// Overwrite the editable fields; admins may also reassign the owner.
    #[instrument(skip(self, actor, input), fields(principal_id = %actor.id), err)]
    pub async fn update(
        &self,
        actor: &Principal,
        id: ProjectId,
        input: ProjectInput,
        requested_owner: Option<UserId>,
    ) -> Result<Project, ServiceError> {
        self.authorized(actor, id).await?;
        let fields = input.into_fields()?;
        let new_owner = reassignment_target(actor, requested_owner);
        if let Some(owner) = new_owner {
            if owner != actor.id {
                self.ensure_known_user(owner).await?;
            }
        }

        let update = self
            .projects
            .update_fields(id, fields, new_owner, Utc::now())
            .await?;
        let project = update.project;

        self.emit(
            actor,
            ProjectChange::FieldsUpdated {
                external_id: project.external_id.clone(),
                owner: project.owner,
            },
        )
        .await;
        if update.previous_owner != project.owner {
            self.emit(
                actor,
                ProjectChange::Reassigned {
                    external_id: project.external_id.clone(),
                    from: update.previous_owner,
                    to: project.owner,
                },
            )
            .await;
        }

        Ok(project)
    }

    /// Remove the project and its modules.
    #[instrument(skip(self, actor), fields(principal_id = %actor.id), err)]
    pub async fn delete(&self, actor: &Principal, id: ProjectId) -> Result<Project, ServiceError> {
        self.authorized(actor, id).await?;
        let removed = self.projects.delete(id).await?;

        self.emit(
            actor,
            ProjectChange::Deleted {
                external_id: removed.external_id.clone(),
                owner: removed.owner,
            },
        )
        .await;

        Ok(removed)
    }

    #[instrument(skip(self, actor, name), fields(principal_id = %actor.id), err)]
    pub async fn add_module(
        &self,
        actor: &Principal,
        id: ProjectId,
        name: &str,
    ) -> Result<Project, ServiceError> {
        self.authorized(actor, id).await?;
        let name = ModuleName::parse(name)?;
        let label = name.as_str().to_string();

        let project = self
            .projects
            .push_module(id, name, actor.id, Utc::now())
            .await?;

        self.emit(
            actor,
            ProjectChange::ModuleAdded {
                external_id: project.external_id.clone(),
                owner: project.owner,
                module: label,
            },
        )
        .await;

        Ok(project)
    }

    #[instrument(skip(self, actor), fields(principal_id = %actor.id), err)]
    pub async fn toggle_module(
        &self,
        actor: &Principal,
        id: ProjectId,
        index: usize,
    ) -> Result<Project, ServiceError> {
        let snapshot = self.authorized(actor, id).await?;
        let target = snapshot.module_at(index)?.clone();

        let project = self
            .projects
            .toggle_module(id, target.id, Utc::now())
            .await?;
        let done = project
            .position_of(target.id)
            .map(|i| project.modules[i].done)
            .unwrap_or(!target.done);

        self.emit(
            actor,
            ProjectChange::ModuleToggled {
                external_id: project.external_id.clone(),
                owner: project.owner,
                module: target.name,
                done,
            },
        )
        .await;

        Ok(project)
    }

    #[instrument(skip(self, actor), fields(principal_id = %actor.id), err)]
    pub async fn delete_module(
        &self,
        actor: &Principal,
        id: ProjectId,
        index: usize,
    ) -> Result<RemovedModule, ServiceError> {
        let snapshot = self.authorized(actor, id).await?;
        let target = snapshot.module_at(index)?.clone();

        let project = self
            .projects
            .remove_module(id, target.id, Utc::now())
            .await?;

        self.emit(
            actor,
            ProjectChange::ModuleDeleted {
                external_id: project.external_id.clone(),
                owner: project.owner,
                module: target.name.clone(),
            },
        )
        .await;

        Ok(RemovedModule {
            project,
            module: target,
        })
    }

    /// Load `id` and check the principal may act on it.
    async fn authorized(&self, actor: &Principal, id: ProjectId) -> Result<Project, ServiceError> {
        let found = self.projects.get(id).await?;
        match authorize(actor, found.as_ref()) {
            Ok(project) => Ok(project.clone()),
            Err(denied) => {
                let explanation = explain_authorization(actor, found.as_ref());
                tracing::debug!(
                    project_id = %id,
                    principal_id = %actor.id,
                    ?explanation,
                    "project access denied"
                );
                Err(denied.into())
            }
        }
    }

    async fn ensure_known_user(&self, user: UserId) -> Result<(), ServiceError> {
        match self.directory.get(user).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::InvalidInput(format!("unknown user {user}"))),
        }
    }

    /// Deliver the notifications `change` calls for. Failures are logged only;
    /// the change itself is already committed.
    async fn emit(&self, actor: &Principal, change: ProjectChange) {
        tracing::info!(
            event_type = change.event_type(),
            external_id = change.external_id(),
            actor = %actor.id,
            "project change committed"
        );

        let drafts = plan(actor, &change);
        if drafts.is_empty() {
            return;
        }
        if let Err(e) = self.inbox.deliver(drafts).await {
            tracing::warn!(
                event_type = change.event_type(),
                external_id = change.external_id(),
                error = %e,
                "notification delivery failed; change kept"
            );
        }
    }
}
