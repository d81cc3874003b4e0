//! User inputs and views.

use super::{validate_text, EntityId, ModelValidationError};
use serde::{Deserialize, Serialize};

pub type UserId = EntityId;

pub const USER_NAME_MAX_CHARS: usize = 100;
pub const USER_EMAIL_MAX_CHARS: usize = 100;

/// Input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreateInput {
    pub name: String,
    /// Unique across all users, compared case-sensitively.
    pub email: String,
}

impl UserCreateInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_user_fields(&self.name, &self.email)
    }
}

/// Input for overwriting a user's name and email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdateInput {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl UserUpdateInput {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_user_fields(&self.name, &self.email)
    }
}

/// Public projection of a user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

fn validate_user_fields(name: &str, email: &str) -> Result<(), ModelValidationError> {
    validate_text("name", name, USER_NAME_MAX_CHARS)?;
    validate_text("email", email, USER_EMAIL_MAX_CHARS)
}
