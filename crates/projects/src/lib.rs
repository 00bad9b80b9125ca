//! Project domain module.
//!
//! A project owns an ordered list of embedded modules. Everything here is
//! deterministic domain logic (no IO, no HTTP, no storage); stores apply the same
//! transitions atomically.

pub mod change;
pub mod input;
pub mod module;
pub mod ownership;
pub mod project;

pub use change::ProjectChange;
pub use input::{NewProject, ProjectFields, ProjectInput, coerce_module_count};
pub use module::{Module, ModuleId, ModuleName};
pub use ownership::{effective_owner, reassignment_target};
pub use project::{Progress, Project};
