//! Project persistence boundary.
//!
//! Projects embed their modules, so every module mutation is an update of the
//! owning project document. Implementations must apply a module push/remove and
//! the matching `module_count` delta in one atomic step.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryProjectStore;
pub use postgres::PostgresProjectStore;
pub use r#trait::{ProjectStore, ProjectUpdate};
