use serde::{Deserialize, Serialize};

use projtrack_core::UserId;

use crate::Role;

/// The authenticated identity performing an operation.
///
/// Produced by the identity collaborator (see [`crate::JwtClaims`]) and passed
/// explicitly into every core operation. Immutable for the duration of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
