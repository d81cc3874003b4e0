//! Kanban domain model.
//!
//! # Responsibility
//! - Define write inputs and read views for users, tags and tasks.
//! - Own field-level validation shared by every repository write path.
//!
//! # Invariants
//! - Every entity is identified by a store-assigned integer id.
//! - Views are read-only projections, never the persisted rows themselves.

use thiserror::Error;

pub mod tag;
pub mod task;
pub mod user;

/// Store-assigned identity of a user, tag or task row.
pub type EntityId = i64;

/// Sentinel id returned next to outcomes that produced no entity.
pub const INVALID_ID: EntityId = -1;

/// Field-level validation failure detected before any SQL mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} exceeds {max} characters (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Checks that `value` is non-blank and at most `max` characters long.
pub(crate) fn validate_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::Required { field });
    }
    let actual = value.chars().count();
    if actual > max {
        return Err(ModelValidationError::TooLong { field, max, actual });
    }
    Ok(())
}
