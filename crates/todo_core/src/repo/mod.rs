//! Repository contract and storage backends.
//!
//! # Responsibility
//! - Define the capability set every task backend implements.
//! - Isolate SQL and locking details from service orchestration.
//!
//! # Invariants
//! - Both backends return the same `RepoError` kinds for the same inputs.
//! - Validation failures are raised before any mutation or SQL statement.
//! - Storage failures are classified, never swallowed.

pub mod error;
pub mod memory_repo;
pub mod sqlite_repo;

use crate::model::task::{Task, UpdateRequest};
use std::sync::Arc;

pub use error::{ErrorKind, RepoError, RepoResult};

/// Repository interface for task CRUD operations.
///
/// Implementations must be safe to share between request-handling threads.
pub trait TaskRepository: Send + Sync {
    /// Persists a new task.
    ///
    /// Generated fields (id, `created_at`) and the normalized name are written
    /// back into `task` on success.
    fn create(&self, task: &mut Task) -> RepoResult<()>;

    /// Loads one task by id.
    fn get_by_id(&self, id: &str) -> RepoResult<Task>;

    /// Applies the fields present in `request` to an existing task.
    ///
    /// Callers re-read with [`TaskRepository::get_by_id`] to observe the
    /// resulting state.
    fn update(&self, id: &str, request: &UpdateRequest) -> RepoResult<()>;

    /// Removes one task by id.
    fn delete(&self, id: &str) -> RepoResult<()>;

    /// Returns every stored task. Ordering is backend-specific.
    fn list_all(&self) -> RepoResult<Vec<Task>>;
}

impl<R: TaskRepository + ?Sized> TaskRepository for &R {
    fn create(&self, task: &mut Task) -> RepoResult<()> {
        (**self).create(task)
    }

    fn get_by_id(&self, id: &str) -> RepoResult<Task> {
        (**self).get_by_id(id)
    }

    fn update(&self, id: &str, request: &UpdateRequest) -> RepoResult<()> {
        (**self).update(id, request)
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        (**self).delete(id)
    }

    fn list_all(&self) -> RepoResult<Vec<Task>> {
        (**self).list_all()
    }
}

impl<R: TaskRepository + ?Sized> TaskRepository for Box<R> {
    fn create(&self, task: &mut Task) -> RepoResult<()> {
        (**self).create(task)
    }

    fn get_by_id(&self, id: &str) -> RepoResult<Task> {
        (**self).get_by_id(id)
    }

    fn update(&self, id: &str, request: &UpdateRequest) -> RepoResult<()> {
        (**self).update(id, request)
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        (**self).delete(id)
    }

    fn list_all(&self) -> RepoResult<Vec<Task>> {
        (**self).list_all()
    }
}

impl<R: TaskRepository + ?Sized> TaskRepository for Arc<R> {
    fn create(&self, task: &mut Task) -> RepoResult<()> {
        (**self).create(task)
    }

    fn get_by_id(&self, id: &str) -> RepoResult<Task> {
        (**self).get_by_id(id)
    }

    fn update(&self, id: &str, request: &UpdateRequest) -> RepoResult<()> {
        (**self).update(id, request)
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        (**self).delete(id)
    }

    fn list_all(&self) -> RepoResult<Vec<Task>> {
        (**self).list_all()
    }
}

/// Rejects the empty id before a backend looks anything up.
pub(crate) fn require_id(id: &str) -> RepoResult<()> {
    if id.is_empty() {
        return Err(RepoError::EmptyId);
    }
    Ok(())
}
