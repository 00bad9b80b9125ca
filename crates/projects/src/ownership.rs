//! Who ends up owning a project after create / update.

use projtrack_auth::Principal;
use projtrack_core::UserId;

/// Owner of a newly created project.
///
/// Only admins may attribute a project to someone else; a requested owner from a
/// regular user is ignored.
pub fn effective_owner(actor: &Principal, requested: Option<UserId>) -> UserId {
    match requested {
        Some(owner) if actor.is_admin() => owner,
        _ => actor.id,
    }
}

/// Owner an update should reassign to, if any.
pub fn reassignment_target(actor: &Principal, requested: Option<UserId>) -> Option<UserId> {
    requested.filter(|_| actor.is_admin())
}
