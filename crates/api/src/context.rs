use projtrack_auth::{Principal, Role};
use projtrack_core::UserId;

/// Principal context for a request (authenticated identity + role).
///
/// Inserted by the auth middleware; immutable for the rest of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn principal_id(&self) -> UserId {
        self.principal.id
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }
}
