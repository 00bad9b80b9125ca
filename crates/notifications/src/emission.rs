//! Which notifications a committed project change produces.
//!
//! Notifications only inform an owner that an admin acted on their project
//! without their direct input. An owner acting on their own project, or any
//! change made by a regular user, produces nothing.

use projtrack_auth::Principal;
use projtrack_projects::ProjectChange;

use crate::NotificationDraft;

/// Decide the notifications for `change` performed by `actor`.
///
/// Pure: no IO, deterministic, one draft per affected party.
pub fn plan(actor: &Principal, change: &ProjectChange) -> Vec<NotificationDraft> {
    if !actor.is_admin() {
        return Vec::new();
    }
    let admin = &actor.username;

    match change {
        ProjectChange::Created { external_id, owner } if *owner != actor.id => {
            vec![NotificationDraft::new(
                *owner,
                format!("Admin {admin} assigned you a new project {external_id}."),
            )]
        }
        // Both sides of a transfer changed state, so both hear about it.
        ProjectChange::Reassigned {
            external_id,
            from,
            to,
        } if from != to => vec![
            NotificationDraft::new(
                *from,
                format!("Admin {admin} reassigned your project {external_id}."),
            ),
            NotificationDraft::new(
                *to,
                format!("Admin {admin} assigned project {external_id} to you."),
            ),
        ],
        ProjectChange::Deleted { external_id, owner } if *owner != actor.id => {
            vec![NotificationDraft::new(
                *owner,
                format!("Admin {admin} deleted your project {external_id}."),
            )]
        }
        ProjectChange::ModuleAdded {
            external_id,
            owner,
            module,
        } if *owner != actor.id => vec![NotificationDraft::new(
            *owner,
            format!("Admin {admin} added a module \"{module}\" to your project {external_id}."),
        )],
        ProjectChange::ModuleDeleted {
            external_id,
            owner,
            module,
        } if *owner != actor.id => vec![NotificationDraft::new(
            *owner,
            format!("Admin {admin} deleted module \"{module}\" from your project {external_id}."),
        )],
        _ => Vec::new(),
    }
}
