//! Task domain model and request shapes.
//!
//! # Responsibility
//! - Define the canonical task record shared by every storage backend.
//! - Define create/update request shapes with explicit partial-update fields.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes afterwards.
//! - `name` is stored trimmed and never empty.
//! - `created_at` is assigned once at creation and never changes afterwards.
//! - An absent update field and an explicit `null` description are distinct.

use serde::{Deserialize, Deserializer, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Opaque task identifier.
///
/// Kept as a type alias because backends are free to choose the id format
/// (service-generated UUIDs for the memory store, table defaults for SQLite).
pub type TaskId = String;

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique id, immutable after creation.
    pub id: TaskId,
    /// Trimmed, non-empty display name.
    pub name: String,
    /// Optional free-form text.
    pub description: Option<String>,
    /// Completion flag, `false` on creation.
    pub completed: bool,
    /// Unix epoch milliseconds, immutable after creation.
    pub created_at: i64,
}

impl Task {
    /// Creates a task candidate with a fresh UUID v4 id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name)
    }

    /// Creates a task candidate with a caller-provided id.
    ///
    /// # Invariants
    /// - `completed` starts as `false`.
    /// - `created_at` is stamped with the current wall clock.
    /// - The name is not validated here; repositories reject blank names.
    pub fn with_id(id: impl Into<TaskId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            completed: false,
            created_at: now_epoch_ms(),
        }
    }
}

/// Request model for creating a task.
///
/// A missing `name` decodes to the empty string so that absence and blank
/// input are rejected through the same `EmptyName` path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial-update request.
///
/// Every field is independently optional. For `description`:
/// - `None`: leave the stored value untouched.
/// - `Some(None)`: clear the stored value (JSON `null`).
/// - `Some(Some(text))`: replace the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateRequest {
    /// Returns `true` when no field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.completed.is_none()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

/// Trims a task name, returning `None` when nothing is left.
pub fn normalize_task_name(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Current wall clock as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

// Only called when the key is present, so a JSON `null` becomes `Some(None)`
// while a missing key falls back to `#[serde(default)]`.
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
