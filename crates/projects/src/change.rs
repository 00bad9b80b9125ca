use serde::Serialize;

use projtrack_core::UserId;

/// A committed project mutation, described with the state notification emission
/// needs: the affected owner(s) and the human-facing names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectChange {
    Created {
        external_id: String,
        owner: UserId,
    },
    FieldsUpdated {
        external_id: String,
        owner: UserId,
    },
    Reassigned {
        external_id: String,
        from: UserId,
        to: UserId,
    },
    Deleted {
        external_id: String,
        owner: UserId,
    },
    ModuleAdded {
        external_id: String,
        owner: UserId,
        module: String,
    },
    ModuleToggled {
        external_id: String,
        owner: UserId,
        module: String,
        done: bool,
    },
    ModuleDeleted {
        external_id: String,
        owner: UserId,
        module: String,
    },
}

impl ProjectChange {
    pub fn event_type(&self) -> &'static str {
        match self {
            ProjectChange::Created { .. } => "project.created",
            ProjectChange::FieldsUpdated { .. } => "project.fields_updated",
            ProjectChange::Reassigned { .. } => "project.reassigned",
            ProjectChange::Deleted { .. } => "project.deleted",
            ProjectChange::ModuleAdded { .. } => "project.module.added",
            ProjectChange::ModuleToggled { .. } => "project.module.toggled",
            ProjectChange::ModuleDeleted { .. } => "project.module.deleted",
        }
    }

    pub fn external_id(&self) -> &str {
        match self {
            ProjectChange::Created { external_id, .. }
            | ProjectChange::FieldsUpdated { external_id, .. }
            | ProjectChange::Reassigned { external_id, .. }
            | ProjectChange::Deleted { external_id, .. }
            | ProjectChange::ModuleAdded { external_id, .. }
            | ProjectChange::ModuleToggled { external_id, .. }
            | ProjectChange::ModuleDeleted { external_id, .. } => external_id,
        }
    }
}
