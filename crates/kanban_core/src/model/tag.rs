//! Tag inputs and views.

use super::{validate_text, EntityId, ModelValidationError};
use serde::{Deserialize, Serialize};

pub type TagId = EntityId;

pub const TAG_NAME_MAX_CHARS: usize = 50;

/// Input for creating a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCreateInput {
    /// Unique across all tags, compared case-sensitively.
    pub name: String,
}

impl TagCreateInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_text("name", &self.name, TAG_NAME_MAX_CHARS)
    }
}

/// Input for renaming a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUpdateInput {
    pub id: TagId,
    pub name: String,
}

impl TagUpdateInput {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_text("name", &self.name, TAG_NAME_MAX_CHARS)
    }
}

/// Lightweight projection of a tag row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagView {
    pub id: TagId,
    pub name: String,
}
