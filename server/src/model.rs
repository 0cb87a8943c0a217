//! Task entity, request payloads, and field validation.
//!
//! # Design
//! Validation lives with the types so every store implementation enforces
//! the same constraints. Length bounds count Unicode scalar values, not
//! bytes, so multibyte titles are measured the same way a user counts them.
//! The title is trimmed before its bounds are checked; the trimmed form is
//! what gets persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Title bounds, applied after trimming surrounding whitespace.
pub const TITLE_MIN: usize = 2;
pub const TITLE_MAX: usize = 50;

/// Description bounds. The description is stored as given.
pub const DESCRIPTION_MIN: usize = 5;
pub const DESCRIPTION_MAX: usize = 255;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    /// Canonical storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// The other status; toggling twice returns the original.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

/// Raised when a stored status string is not one of the two known values.
#[derive(Debug, Clone, Error)]
#[error("unknown task status: {0}")]
pub struct ParseStatusError(pub String);

impl TryFrom<&str> for TaskStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(ParseStatusError(other.to_owned())),
        }
    }
}

/// A task as served over the API. `deleted_at` never leaves the store, so
/// it has no field here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task. Status is not accepted on create; new tasks
/// always start pending.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
}

/// Allow-listed updatable fields. Unknown fields in a request body are
/// dropped during deserialization and can never reach a row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

/// A single field constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// One entry per offending field, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A `NewTask` that passed validation; the title is already trimmed.
#[derive(Debug, Clone)]
pub struct ValidNewTask {
    pub title: String,
    pub description: String,
}

/// A `TaskChanges` that passed validation; a present title is trimmed.
#[derive(Debug, Clone, Default)]
pub struct ValidTaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl NewTask {
    /// Checks both fields and reports every violation, not just the first.
    pub fn validated(self) -> Result<ValidNewTask, ValidationErrors> {
        let title = validate_title(&self.title);
        let description = validate_description(&self.description);
        match (title, description) {
            (Ok(title), Ok(())) => Ok(ValidNewTask {
                title,
                description: self.description,
            }),
            (title, description) => {
                let mut errors = Vec::new();
                if let Err(e) = title {
                    errors.push(e);
                }
                if let Err(e) = description {
                    errors.push(e);
                }
                Err(ValidationErrors(errors))
            }
        }
    }
}

impl TaskChanges {
    /// Re-validates only the fields present in the partial update.
    pub fn validated(self) -> Result<ValidTaskChanges, ValidationErrors> {
        let mut errors = Vec::new();

        let title = match self.title.as_deref().map(validate_title) {
            Some(Ok(title)) => Some(title),
            Some(Err(e)) => {
                errors.push(e);
                None
            }
            None => None,
        };
        if let Some(Err(e)) = self.description.as_deref().map(validate_description) {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(ValidTaskChanges {
                title,
                description: self.description,
                status: self.status,
            })
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Trims the title, then enforces the 2..=50 bound. Returns the trimmed
/// form on success.
pub fn validate_title(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < TITLE_MIN || len > TITLE_MAX {
        return Err(FieldError {
            field: "title",
            message: format!(
                "must be between {TITLE_MIN} and {TITLE_MAX} characters after trimming, got {len}"
            ),
        });
    }
    Ok(trimmed.to_owned())
}

/// Enforces the 5..=255 bound on the description as given.
pub fn validate_description(raw: &str) -> Result<(), FieldError> {
    let len = raw.chars().count();
    if len < DESCRIPTION_MIN || len > DESCRIPTION_MAX {
        return Err(FieldError {
            field: "description",
            message: format!(
                "must be between {DESCRIPTION_MIN} and {DESCRIPTION_MAX} characters, got {len}"
            ),
        });
    }
    Ok(())
}
