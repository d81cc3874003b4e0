//! Task domain model.
//!
//! # Responsibility
//! - Define the task lifecycle state and its persisted text form.
//! - Define task write inputs and the detail/summary read views.
//!
//! # Invariants
//! - New tasks always start in `TaskState::New`.
//! - Persisted state text is exactly the variant name (`"Active"`, ...).
//! - `state_updated` is refreshed on every update and on soft removal.

use super::user::UserId;
use super::{validate_text, EntityId, ModelValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

pub type TaskId = EntityId;

pub const TASK_TITLE_MAX_CHARS: usize = 100;

/// Kanban lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Created, nobody has picked it up yet.
    New,
    /// Work is in progress.
    Active,
    /// Work is done, awaiting closure.
    Resolved,
    /// Finished and archived.
    Closed,
    /// Soft-deleted after being active.
    Removed,
}

impl TaskState {
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Active,
        Self::Resolved,
        Self::Closed,
        Self::Removed,
    ];

    /// Text form stored in `tasks.state`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Active => "Active",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
            Self::Removed => "Removed",
        }
    }
}

impl Display for TaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when persisted state text names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown task state `{0}`")]
pub struct ParseTaskStateError(pub String);

impl FromStr for TaskState {
    type Err = ParseTaskStateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == value)
            .ok_or_else(|| ParseTaskStateError(value.to_string()))
    }
}

/// Input for creating a task.
///
/// Tag names are resolved against existing tags by exact match; names with
/// no matching tag are dropped without creating anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCreateInput {
    pub title: String,
    pub assigned_to_id: Option<UserId>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl TaskCreateInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_text("title", &self.title, TASK_TITLE_MAX_CHARS)
    }
}

/// Input for updating a task.
///
/// `None` for `assigned_to_id`, `description` or `tags` leaves the stored
/// value untouched. `title` and `state` are always overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdateInput {
    pub id: TaskId,
    pub title: String,
    pub assigned_to_id: Option<UserId>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub state: TaskState,
}

impl TaskUpdateInput {
    /// Builds an update that only rewrites title and state.
    pub fn new(id: TaskId, title: impl Into<String>, state: TaskState) -> Self {
        Self {
            id,
            title: title.into(),
            assigned_to_id: None,
            description: None,
            tags: None,
            state,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_text("title", &self.title, TASK_TITLE_MAX_CHARS)
    }
}

/// Full projection of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    /// Display name of the assignee, if any.
    pub assigned_to_name: Option<String>,
    /// Tag names sorted by name.
    pub tags: Vec<String>,
    pub state: TaskState,
    pub state_updated: DateTime<Utc>,
}

/// List projection of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: TaskId,
    pub title: String,
    pub assigned_to_name: Option<String>,
    pub tags: Vec<String>,
    pub state: TaskState,
}
