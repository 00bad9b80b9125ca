use serde::Deserialize;
use serde_json::{Value, json};

use projtrack_core::UserId;
use projtrack_infra::{CreatedProject, DirectoryEntry};
use projtrack_notifications::Notification;
use projtrack_projects::{Project, ProjectInput};

// -------------------------
// Request DTOs
// -------------------------

/// Body of project create / update.
///
/// `module_count` accepts a number or a string; anything unusable becomes 0.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectRequest {
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub module_count: Option<Value>,
    /// Requested owner; only honored for admins.
    pub owner: Option<String>,
}

impl ProjectRequest {
    pub fn into_parts(self) -> Result<(ProjectInput, Option<UserId>), String> {
        let owner = match self.owner.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<UserId>().map_err(|e| e.to_string())?),
        };
        let module_count = self.module_count.and_then(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let input = ProjectInput {
            external_id: self.project_id,
            name: self.name,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            module_count,
        };
        Ok((input, owner))
    }
}

#[derive(Debug, Deserialize)]
pub struct AddModuleRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListNotificationsQuery {
    pub limit: Option<usize>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn project_to_json(p: &Project) -> Value {
    let modules: Vec<Value> = p
        .modules
        .iter()
        .enumerate()
        .map(|(index, m)| {
            json!({
                "index": index,
                "name": m.name,
                "done": m.done,
                "assigned_by": m.assigned_by.to_string(),
                "assigned_at": m.assigned_at,
            })
        })
        .collect();

    json!({
        "id": p.id.to_string(),
        "project_id": p.external_id,
        "name": p.name,
        "description": p.description,
        "start_date": p.start_date,
        "end_date": p.end_date,
        "module_count": p.module_count,
        "owner": p.owner.to_string(),
        "modules": modules,
        "progress": p.progress(),
        "created_at": p.created_at,
        "updated_at": p.updated_at,
    })
}

pub fn created_to_json(created: &CreatedProject) -> Value {
    json!({
        "project": project_to_json(&created.project),
        "assigned_to_other": created.assigned_to_other,
    })
}

pub fn notification_to_json(n: &Notification) -> Value {
    json!({
        "id": n.id.to_string(),
        "message": n.message,
        "read": n.read,
        "created_at": n.created_at,
    })
}

pub fn directory_entry_to_json(e: &DirectoryEntry) -> Value {
    json!({
        "id": e.id.to_string(),
        "username": e.username,
        "role": e.role.as_str(),
    })
}
