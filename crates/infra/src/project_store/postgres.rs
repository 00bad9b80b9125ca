//! Postgres-backed project store.
//!
//! Modules are stored inline in `projects.modules` (JSONB array, position order).
//! Every module mutation is a single `UPDATE ... RETURNING`, so the array change,
//! the `module_count` delta and `next_module_id` allocation commit together.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::{Span, instrument};

use projtrack_core::{ProjectId, UserId};
use projtrack_projects::{Module, ModuleId, ModuleName, Project, ProjectFields};

use super::r#trait::{ProjectStore, ProjectUpdate};
use crate::db::{is_unique_violation, map_sqlx_error};
use crate::error::StoreError;

const PROJECT_COLUMNS: &str = "id, external_id, name, description, start_date, end_date, \
     module_count, owner_id, modules, next_module_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresProjectStore {
    pool: Arc<PgPool>,
}

impl PostgresProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Distinguish "project gone" from "module gone" after an update matched no row.
    async fn missing(&self, id: ProjectId, operation: &str) -> StoreError {
        let exists = sqlx::query("SELECT 1 FROM projects WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await;
        match exists {
            Ok(Some(_)) => StoreError::NotFound("module"),
            Ok(None) => StoreError::NotFound("project"),
            Err(e) => map_sqlx_error(operation, e),
        }
    }
}

fn project_from_row(row: &PgRow) -> Result<Project, sqlx::Error> {
    let module_count: i64 = row.try_get("module_count")?;
    let next_module_id: i64 = row.try_get("next_module_id")?;
    let Json(modules): Json<Vec<Module>> = row.try_get("modules")?;

    Ok(Project {
        id: ProjectId::from_uuid(row.try_get("id")?),
        external_id: row.try_get("external_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        start_date: row.try_get::<Option<NaiveDate>, _>("start_date")?,
        end_date: row.try_get::<Option<NaiveDate>, _>("end_date")?,
        module_count: u32::try_from(module_count).unwrap_or(u32::MAX),
        owner: UserId::from_uuid(row.try_get("owner_id")?),
        modules,
        next_module_id: u64::try_from(next_module_id).unwrap_or(1),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn decode(operation: &str, row: &PgRow) -> Result<Project, StoreError> {
    project_from_row(row)
        .map_err(|e| StoreError::storage(format!("failed to decode project row in {operation}: {e}")))
}

#[async_trait::async_trait]
impl ProjectStore for PostgresProjectStore {
    #[instrument(skip(self), fields(project_id = %id), err)]
    async fn get(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_project", e))?;

        row.as_ref().map(|r| decode("get_project", r)).transpose()
    }

    #[instrument(skip(self), fields(result_count = tracing::field::Empty), err)]
    async fn list(&self, owner: Option<UserId>) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            WHERE $1::uuid IS NULL OR owner_id = $1
            ORDER BY start_date ASC NULLS FIRST, created_at ASC, id ASC
            "#
        ))
        .bind(owner.map(|o| *o.as_uuid()))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_projects", e))?;

        let projects = rows
            .iter()
            .map(|r| decode("list_projects", r))
            .collect::<Result<Vec<_>, _>>()?;
        Span::current().record("result_count", projects.len());
        Ok(projects)
    }

    #[instrument(skip(self, project), fields(external_id = %project.external_id), err)]
    async fn insert(&self, project: Project) -> Result<Project, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO projects (
                id, external_id, name, description, start_date, end_date,
                module_count, owner_id, modules, next_module_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(*project.id.as_uuid())
        .bind(&project.external_id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(i64::from(project.module_count))
        .bind(*project.owner.as_uuid())
        .bind(Json(&project.modules))
        .bind(i64::try_from(project.next_module_id).unwrap_or(i64::MAX))
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&*self.pool)
        .await;

        match result {
            Ok(_) => Ok(project),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Conflict(format!(
                "project id '{}' already exists",
                project.external_id
            ))),
            Err(e) => Err(map_sqlx_error("insert_project", e)),
        }
    }

    #[instrument(skip(self, values), fields(project_id = %id), err)]
    async fn update_fields(
        &self,
        id: ProjectId,
        values: ProjectFields,
        new_owner: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<ProjectUpdate, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE projects p
            SET name = $2,
                description = $3,
                start_date = $4,
                end_date = $5,
                module_count = $6,
                owner_id = COALESCE($7, p.owner_id),
                updated_at = $8
            FROM (SELECT id, owner_id FROM projects WHERE id = $1 FOR UPDATE) prev
            WHERE p.id = prev.id
            RETURNING p.id, p.external_id, p.name, p.description, p.start_date, p.end_date,
                      p.module_count, p.owner_id, p.modules, p.next_module_id,
                      p.created_at, p.updated_at, prev.owner_id AS previous_owner_id
            "#,
        )
        .bind(*id.as_uuid())
        .bind(&values.name)
        .bind(&values.description)
        .bind(values.start_date)
        .bind(values.end_date)
        .bind(i64::from(values.module_count))
        .bind(new_owner.map(|o| *o.as_uuid()))
        .bind(now)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_project", e))?
        .ok_or(StoreError::NotFound("project"))?;

        let project = decode("update_project", &row)?;
        let previous_owner = row
            .try_get::<uuid::Uuid, _>("previous_owner_id")
            .map(UserId::from_uuid)
            .map_err(|e| map_sqlx_error("update_project", e))?;
        Ok(ProjectUpdate {
            project,
            previous_owner,
        })
    }

    #[instrument(skip(self), fields(project_id = %id), err)]
    async fn delete(&self, id: ProjectId) -> Result<Project, StoreError> {
        let row = sqlx::query(&format!(
            "DELETE FROM projects WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_project", e))?
        .ok_or(StoreError::NotFound("project"))?;

        decode("delete_project", &row)
    }

    #[instrument(skip(self, name), fields(project_id = %id), err)]
    async fn push_module(
        &self,
        id: ProjectId,
        name: ModuleName,
        assigned_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError> {
        // `id` is filled in from the row's counter inside the same statement.
        let body = serde_json::json!({
            "name": name.as_str(),
            "done": false,
            "assigned_by": assigned_by,
            "assigned_at": now,
        });

        let row = sqlx::query(&format!(
            r#"
            UPDATE projects
            SET modules = modules || jsonb_build_array($2::jsonb || jsonb_build_object('id', next_module_id)),
                next_module_id = next_module_id + 1,
                module_count = module_count + 1,
                updated_at = $3
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(*id.as_uuid())
        .bind(Json(body))
        .bind(now)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("push_module", e))?
        .ok_or(StoreError::NotFound("project"))?;

        decode("push_module", &row)
    }

    #[instrument(skip(self), fields(project_id = %id, module_id = %module), err)]
    async fn toggle_module(
        &self,
        id: ProjectId,
        module: ModuleId,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE projects
            SET modules = (
                    SELECT jsonb_agg(
                        CASE WHEN elem->'id' = to_jsonb($2::bigint)
                             THEN jsonb_set(elem, '{{done}}',
                                  to_jsonb(NOT COALESCE((elem->>'done')::boolean, false)))
                             ELSE elem
                        END
                        ORDER BY ord)
                    FROM jsonb_array_elements(modules) WITH ORDINALITY AS m(elem, ord)
                ),
                updated_at = $3
            WHERE id = $1
              AND modules @> jsonb_build_array(jsonb_build_object('id', $2::bigint))
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(*id.as_uuid())
        .bind(i64::try_from(module.0).unwrap_or(i64::MAX))
        .bind(now)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("toggle_module", e))?;

        match row {
            Some(row) => decode("toggle_module", &row),
            None => Err(self.missing(id, "toggle_module").await),
        }
    }

    #[instrument(skip(self), fields(project_id = %id, module_id = %module), err)]
    async fn remove_module(
        &self,
        id: ProjectId,
        module: ModuleId,
        now: DateTime<Utc>,
    ) -> Result<Project, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE projects
            SET modules = COALESCE((
                    SELECT jsonb_agg(elem ORDER BY ord)
                    FROM jsonb_array_elements(modules) WITH ORDINALITY AS m(elem, ord)
                    WHERE elem->'id' <> to_jsonb($2::bigint)
                ), '[]'::jsonb),
                module_count = GREATEST(module_count - 1, 0),
                updated_at = $3
            WHERE id = $1
              AND modules @> jsonb_build_array(jsonb_build_object('id', $2::bigint))
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(*id.as_uuid())
        .bind(i64::try_from(module.0).unwrap_or(i64::MAX))
        .bind(now)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("remove_module", e))?;

        match row {
            Some(row) => decode("remove_module", &row),
            None => Err(self.missing(id, "remove_module").await),
        }
    }
}
