use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use projtrack_core::{ProjectId, UserId};
use projtrack_projects::{ModuleId, ModuleName, Project, ProjectFields};

use super::r#trait::{ProjectStore, ProjectUpdate};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Table {
    by_id: HashMap<ProjectId, Project>,
    by_external_id: HashMap<String, ProjectId>,
}

/// In-memory project store.
///
/// Intended for tests/dev. Every mutation runs under one write lock, which makes
/// each module push/remove and its counter change a single step.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    table: RwLock<Table>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_project<T>(
        &self,
        id: ProjectId,
        f: impl FnOnce(&mut Project) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        let project = table
            .by_id
            .get_mut(&id)
            .ok_or(StoreError::NotFound("project"))?;
        f(project)
    }
}

fn listing_order(a: &Project, b: &Project) -> std::cmp::Ordering {
    a.start_date
        .cmp(&b.start_date)
        .then(a.created_at.cmp(&b.created_at))
        .then(a.id.cmp(&b.id))
}

#[async_trait::async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn get(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        let table = self
            .table
            .read()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        Ok(table.by_id.get(&id).cloned())
    }

    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Project>, StoreError> {
        let table = self
            .table
            .read()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        let mut out: Vec<Project> = table
            .by_id
            .values()
            .filter(|p| owner.is_none_or(|o| p.owner == o))
            .cloned()
            .collect();
        out.sort_by(listing_order);
        Ok(out)
    }

    async fn insert(&self, project: Project) -> Result<Project, StoreError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        if table.by_external_id.contains_key(&project.external_id) {
            return Err(StoreError::Conflict(format!(
                "project id '{}' already exists",
                project.external_id
            )));
        }
        table
            .by_external_id
            .insert(project.external_id.clone(), project.id);
        table.by_id.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_fields(
        &self,
        id: ProjectId,
        fields: ProjectFields,
        new_owner: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<ProjectUpdate, StoreError> {
        self.with_project(id, |project| {
            let previous_owner = project.owner;
            project.set_fields(fields, now);
            if let Some(owner) = new_owner {
                project.reassign(owner, now);
            }
            Ok(ProjectUpdate {
                project: project.clone(),
                previous_owner,
            })
        })
    }

    async fn delete(&self, id: ProjectId) -> Result<Project, StoreError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StoreError::storage("lock poisoned"))?;
        let removed = table
            .by_id
            .remove(&id)
            .ok_or(StoreError::NotFound("project"))?;
        table.by_external_id.remove(&removed.external_id);
        Ok(removed)
    }

    async fn push_module(
        &self,
        id: ProjectId,
        name: ModuleName,
        assigned_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError> {
        self.with_project(id, |project| {
            project.push_module(name, assigned_by, now);
            Ok(project.clone())
        })
    }

    async fn toggle_module(
        &self,
        id: ProjectId,
        module: ModuleId,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError> {
        self.with_project(id, |project| {
            project
                .toggle_module(module, now)
                .map_err(|_| StoreError::NotFound("module"))?;
            Ok(project.clone())
        })
    }

    async fn remove_module(
        &self,
        id: ProjectId,
        module: ModuleId,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError> {
        self.with_project(id, |project| {
            project
                .remove_module(module, now)
                .map_err(|_| StoreError::NotFound("module"))?;
            Ok(project.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use projtrack_projects::NewProject;

    fn project(external_id: &str, owner: UserId, start: Option<NaiveDate>) -> Project {
        Project::new(
            ProjectId::new(),
            NewProject {
                external_id: external_id.to_string(),
                fields: ProjectFields {
                    name: external_id.to_string(),
                    start_date: start,
                    ..ProjectFields::default()
                },
            },
            owner,
            Utc::now(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[tokio::test]
    async fn duplicate_external_id_conflicts() {
        let store = InMemoryProjectStore::new();
        let owner = UserId::new();
        store.insert(project("Pro1001", owner, None)).await.unwrap();

        let err = store
            .insert(project("Pro1001", UserId::new(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_frees_external_id() {
        let store = InMemoryProjectStore::new();
        let p = store
            .insert(project("Pro1001", UserId::new(), None))
            .await
            .unwrap();
        store.delete(p.id).await.unwrap();

        assert_eq!(store.get(p.id).await.unwrap(), None);
        store
            .insert(project("Pro1001", UserId::new(), None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_orders_by_start_date_with_undated_first() {
        let store = InMemoryProjectStore::new();
        let owner = UserId::new();
        let other = UserId::new();
        store
            .insert(project("late", owner, date(2025, 6, 1)))
            .await
            .unwrap();
        store.insert(project("undated", owner, None)).await.unwrap();
        store
            .insert(project("early", owner, date(2024, 1, 1)))
            .await
            .unwrap();
        store
            .insert(project("foreign", other, date(2020, 1, 1)))
            .await
            .unwrap();

        let mine: Vec<String> = store
            .list(Some(owner))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.external_id)
            .collect();
        assert_eq!(mine, vec!["undated", "early", "late"]);
        assert_eq!(store.list(None).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn module_mutations_on_missing_targets() {
        let store = InMemoryProjectStore::new();
        let by = UserId::new();
        let err = store
            .push_module(
                ProjectId::new(),
                ModuleName::parse("x").unwrap(),
                by,
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("project"));

        let p = store.insert(project("Pro1001", by, None)).await.unwrap();
        let err = store
            .toggle_module(p.id, ModuleId(42), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("module"));
        let err = store
            .remove_module(p.id, ModuleId(42), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("module"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn stale_module_id_is_not_found_after_concurrent_remove() {
        let store = std::sync::Arc::new(InMemoryProjectStore::new());
        let owner = UserId::new();
        let p = store.insert(project("Pro1001", owner, None)).await.unwrap();
        for name in ["a", "b", "c"] {
            store
                .push_module(p.id, ModuleName::parse(name).unwrap(), owner, Utc::now())
                .await
                .unwrap();
        }

        // Two callers resolved index 1 on the same snapshot.
        let snapshot = store.get(p.id).await.unwrap().unwrap();
        let stale = snapshot.modules[1].id;
        let racers: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.remove_module(p.id, stale, Utc::now()).await })
            })
            .collect();
        let mut removed = 0;
        for handle in racers {
            match handle.await.unwrap() {
                Ok(_) => removed += 1,
                Err(e) => assert_eq!(e, StoreError::NotFound("module")),
            }
        }
        assert_eq!(removed, 1);

        let after = store.get(p.id).await.unwrap().unwrap();
        assert_eq!(
            store.toggle_module(p.id, stale, Utc::now()).await.unwrap_err(),
            StoreError::NotFound("module")
        );
        assert_eq!(
            store.remove_module(p.id, stale, Utc::now()).await.unwrap_err(),
            StoreError::NotFound("module")
        );

        let unchanged = store.get(p.id).await.unwrap().unwrap();
        assert_eq!(unchanged, after);
        let names: Vec<&str> = unchanged.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(unchanged.modules.iter().all(|m| !m.done));
        assert_eq!(unchanged.module_count, 2);
    }

    #[tokio::test]
    async fn update_reports_previous_owner() {
        let store = InMemoryProjectStore::new();
        let (u, v) = (UserId::new(), UserId::new());
        let p = store.insert(project("Pro1001", u, None)).await.unwrap();

        let update = store
            .update_fields(
                p.id,
                ProjectFields {
                    name: "Renamed".to_string(),
                    ..ProjectFields::default()
                },
                Some(v),
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(update.previous_owner, u);
        assert_eq!(update.project.owner, v);
        assert_eq!(update.project.name, "Renamed");
    }
}
