//! Domain types and validation rules for taskdeck entities.

/// Deadline classification helpers.
pub mod deadline;
/// Identifier types.
pub mod id;
/// Caller capability labels.
pub mod role;

use crate::id::{TaskId, TodoId};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub use role::Role;

/// A dated, typed unit of work with a deadline and completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier assigned by the store on creation.
    pub id: TaskId,
    /// Human-readable title. Never empty after validation.
    pub title: String,
    /// Free-form category label. The UI offers suggestions but the server
    /// accepts any non-empty value.
    #[serde(rename = "type")]
    pub kind: String,
    /// Deadline for the task.
    #[serde(with = "time::serde::rfc3339")]
    pub max_end_date: OffsetDateTime,
    /// Completion flag. Always false on creation.
    pub completed: bool,
}

/// An undated, note-bearing unit of work with a completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Identifier assigned by the store on creation.
    pub id: TodoId,
    /// Human-readable title. Never empty after validation.
    pub title: String,
    /// Optional notes; stored as the empty string when absent, never null.
    pub notes: String,
    /// Completion flag. Always false on creation.
    pub completed: bool,
}

/// Raw task payload as received over the wire, before validation.
///
/// Every field is optional so that validation, not deserialization, reports
/// the missing ones. A `completed` value in the payload is deliberately
/// absent here: creation always starts in the active state.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    /// Title, required.
    #[serde(default)]
    pub title: Option<String>,
    /// Category label, required.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Deadline as an RFC 3339 timestamp, required.
    #[serde(default)]
    pub max_end_date: Option<String>,
}

/// Raw todo payload as received over the wire, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoInput {
    /// Title, required.
    #[serde(default)]
    pub title: Option<String>,
    /// Optional notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validated task fields ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Non-empty title.
    pub title: String,
    /// Non-empty category label.
    pub kind: String,
    /// Parsed deadline.
    pub max_end_date: OffsetDateTime,
}

/// Validated todo fields ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    /// Non-empty title.
    pub title: String,
    /// Notes, defaulted to the empty string.
    pub notes: String,
}

impl TaskInput {
    /// Check every required field and return all violations at once.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] listing each missing or malformed field.
    pub fn validate(self) -> Result<TaskDraft, ValidationError> {
        let mut violations = Vec::new();
        let title = require_text("title", "Title is required", self.title, &mut violations);
        let kind = require_text("type", "Type is required", self.kind, &mut violations);
        let max_end_date = match self.max_end_date.as_deref() {
            None | Some("") => {
                violations.push(FieldViolation::new("maxEndDate", "Max end date is required"));
                None
            }
            Some(raw) => match OffsetDateTime::parse(raw, &Rfc3339) {
                Ok(ts) => Some(ts),
                Err(_) => {
                    violations.push(FieldViolation::new(
                        "maxEndDate",
                        "Max end date must be an RFC 3339 timestamp",
                    ));
                    None
                }
            },
        };

        match (title, kind, max_end_date) {
            (Some(title), Some(kind), Some(max_end_date)) => Ok(TaskDraft {
                title,
                kind,
                max_end_date,
            }),
            _ => Err(ValidationError { violations }),
        }
    }
}

impl TodoInput {
    /// Check every required field and return all violations at once.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] listing each missing field.
    pub fn validate(self) -> Result<TodoDraft, ValidationError> {
        let mut violations = Vec::new();
        let title = require_text("title", "Title is required", self.title, &mut violations);

        title.map_or(Err(ValidationError { violations }), |title| {
            Ok(TodoDraft {
                title,
                notes: self.notes.unwrap_or_default(),
            })
        })
    }
}

fn require_text(
    field: &'static str,
    message: &'static str,
    value: Option<String>,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match value {
        Some(text) if !text.is_empty() => Some(text),
        _ => {
            violations.push(FieldViolation::new(field, message));
            None
        }
    }
}

/// A single violated field reported by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Wire name of the field.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: &'static str,
}

impl FieldViolation {
    /// Build a violation for `field`.
    #[must_use]
    pub const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Exhaustive validation failure: every violated field, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// All violations found in the payload.
    pub violations: Vec<FieldViolation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed:")?;
        for violation in &self.violations {
            write!(f, " {}: {};", violation.field, violation.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Which collection an operation targets. Used in errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// The `tasks` collection.
    Task,
    /// The `todos` collection.
    Todo,
}

impl EntityKind {
    /// Capitalized label used in user-facing messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Todo => "Todo",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
