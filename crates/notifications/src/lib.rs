//! Notification domain module: the recipient-scoped inbox record and the pure
//! decision of which notifications a project change produces.

pub mod emission;
pub mod notification;

pub use emission::plan;
pub use notification::{
    DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT, Notification, NotificationDraft, clamp_limit,
};
