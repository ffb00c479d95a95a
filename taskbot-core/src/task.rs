//! Task records for the shared to-do list.
//!
//! A task's `id` is a positive integer assigned as `max(existing ids) + 1`
//! when it is created (the store computes this). Ids are never re-numbered,
//! but deleting the highest-numbered task means its id is handed out again
//! on the next create — that reissue rule is load-bearing and covered by
//! tests in the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Priority bucket for a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Needs attention before anything else.
    High,
    /// The default bucket.
    #[default]
    Medium,
    /// Can wait.
    Low,
}

impl Priority {
    /// Parses a priority token, returning `None` for unrecognized input.
    ///
    /// Callers decide what `None` means: task creation coerces it to
    /// [`Priority::Medium`], task update leaves the field unchanged.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "high" | "h" => Some(Self::High),
            "medium" | "med" | "m" => Some(Self::Medium),
            "low" | "l" => Some(Self::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// A single entry in the shared to-do list.
///
/// Persisted verbatim as one element of the task file's JSON array.
/// `description` and the lifecycle timestamps are optional so documents
/// written by earlier revisions of the bot still deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Positive integer id, unique within the store.
    pub id: u64,
    /// Non-empty text label.
    pub name: String,
    /// Longer free-text description; required at creation in this revision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Account the task is currently assigned to; defaults to the creator.
    pub assigned_to: UserId,
    /// Whether the task has been completed.
    pub done: bool,
    /// Priority bucket, defaulting to medium.
    #[serde(default)]
    pub priority: Priority,
    /// Account that created the task. Immutable.
    pub creator: UserId,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was marked done; absent until that happens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// When the task was last edited via `taskupdate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Free-text deadline label. Not validated as a real date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    /// Name of the owning team, if any. Nulled when that team is deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}
