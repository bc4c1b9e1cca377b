//! Task categories.
//!
//! Category names are not unique per user; two categories named "Work" are
//! distinct rows and are always addressed by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Display color, e.g. `#4F46E5`.
    pub color: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Unvalidated category creation payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: Option<String>,
    pub color: Option<String>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    pub user_id: UserId,
}

impl CategoryInput {
    /// # Errors
    /// Rejects a blank name, a missing color or a missing owner.
    pub fn validate(self) -> Result<NewCategory, ValidationError> {
        let mut errors = ValidationError::new();
        let name = self.name.filter(|n| !n.trim().is_empty());
        if name.is_none() {
            errors.push("name", "Category name is required");
        }
        let color = self.color.filter(|c| !c.trim().is_empty());
        if color.is_none() {
            errors.push("color", "Category color is required");
        }
        if self.user_id.is_none() {
            errors.push("userId", "User ID is required");
        }

        match (name, color, self.user_id) {
            (Some(name), Some(color), Some(user_id)) => Ok(NewCategory {
                name,
                color,
                user_id,
            }),
            _ => Err(errors),
        }
    }
}
