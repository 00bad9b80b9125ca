//! `projtrack-auth`: identity and ownership authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod principal;
pub mod roles;

pub use authorize::{
    AuthorizationExplanation, AuthzError, DenialKind, Owned, authorize, explain_authorization,
};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use principal::Principal;
pub use roles::Role;
