//! Core of the planner: local category/task storage plus the selection and
//! editing state a front end drives.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{Category, CategoryId, DEFAULT_CATEGORY_NAME};
pub use model::task::{
    current_timestamp, format_last_modified, CategoryTasks, TaskId, TaskSummary,
    DEFAULT_TASK_NAME, LAST_MODIFIED_FORMAT,
};
pub use repo::store::{SqliteStore, Store, StoreError, StoreResult};
pub use service::deferred::DeferredAction;
pub use service::session::{
    EditorState, PlannerSession, TickEvents, FALLBACK_TASK_TITLE, SAVED_NOTICE_TEXT,
};
pub use settings::{PlannerSettings, SettingsError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
