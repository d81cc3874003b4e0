//! Core data access for the kanban board.
//! This crate owns the uniqueness and task lifecycle rules for users, tags
//! and tasks stored in SQLite.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::tag::{TagCreateInput, TagId, TagUpdateInput, TagView};
pub use model::task::{
    ParseTaskStateError, TaskCreateInput, TaskDetails, TaskId, TaskState, TaskSummary,
    TaskUpdateInput,
};
pub use model::user::{UserCreateInput, UserId, UserUpdateInput, UserView};
pub use model::{EntityId, ModelValidationError, INVALID_ID};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult, Response};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
