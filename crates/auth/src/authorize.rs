use serde::Serialize;
use thiserror::Error;

use projtrack_core::UserId;

use crate::{Principal, Role};

/// A resource attributed to a single owner.
pub trait Owned {
    fn owner(&self) -> UserId;
}

impl<T: Owned + ?Sized> Owned for &T {
    fn owner(&self) -> UserId {
        (**self).owner()
    }
}

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not found")]
    NotFound,

    #[error("forbidden: not the owner")]
    Forbidden,
}

/// Ownership check for a resolved (or missing) resource.
///
/// - No IO
/// - No panics
/// - Existence is checked before the role/owner comparison
///
/// On success the resource is handed back so callers don't look it up twice.
pub fn authorize<R: Owned>(principal: &Principal, resource: Option<R>) -> Result<R, AuthzError> {
    let resource = resource.ok_or(AuthzError::NotFound)?;
    if principal.is_admin() || resource.owner() == principal.id {
        Ok(resource)
    } else {
        Err(AuthzError::Forbidden)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an ownership decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub granted: bool,
    pub reason: String,
    pub principal_id: UserId,
    pub role: Role,
    pub owner_id: Option<UserId>,
    pub denial: Option<DenialKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    NotFound,
    NotOwner,
}

/// Explain why [`authorize`] would allow or deny the principal.
///
/// Always agrees with `authorize`; intended for audit logs.
pub fn explain_authorization<R: Owned>(
    principal: &Principal,
    resource: Option<&R>,
) -> AuthorizationExplanation {
    let owner_id = resource.map(|r| r.owner());

    let (granted, reason, denial) = match owner_id {
        None => (false, "resource does not exist".to_string(), Some(DenialKind::NotFound)),
        Some(_) if principal.is_admin() => (
            true,
            "principal has the admin role".to_string(),
            None,
        ),
        Some(owner) if owner == principal.id => (
            true,
            "principal owns the resource".to_string(),
            None,
        ),
        Some(owner) => (
            false,
            format!(
                "principal {} is neither admin nor the owner ({owner})",
                principal.id
            ),
            Some(DenialKind::NotOwner),
        ),
    };

    AuthorizationExplanation {
        granted,
        reason,
        principal_id: principal.id,
        role: principal.role,
        owner_id,
        denial,
    }
}
