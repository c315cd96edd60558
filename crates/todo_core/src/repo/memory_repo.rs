//! Process-local task repository.
//!
//! # Responsibility
//! - Keep tasks in an owned, lock-guarded map for the lifetime of the store.
//! - Honor the same error contract as the SQLite backend.
//!
//! # Invariants
//! - One mutex guards the whole state and is held for the full operation, so
//!   readers observe either the pre- or post-update task, never a mix.
//! - Callers supply the id; an id already present is rejected, not replaced.
//! - `list_all` returns tasks in insertion order.

use crate::model::task::{normalize_task_name, Task, TaskId, UpdateRequest};
use crate::repo::{require_id, RepoError, RepoResult, TaskRepository};
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    tasks: HashMap<TaskId, Task>,
    order: Vec<TaskId>,
}

/// In-memory task repository. Contents are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryTaskRepository {
    state: Mutex<MemoryState>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks.
    pub fn len(&self) -> RepoResult<usize> {
        Ok(self.lock()?.tasks.len())
    }

    pub fn is_empty(&self) -> RepoResult<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| RepoError::LockPoisoned("memory task store"))
    }
}

impl TaskRepository for MemoryTaskRepository {
    fn create(&self, task: &mut Task) -> RepoResult<()> {
        require_id(&task.id)?;
        let name = normalize_task_name(&task.name).ok_or(RepoError::EmptyName)?;

        let mut state = self.lock()?;
        if state.tasks.contains_key(&task.id) {
            debug!(
                "event=task_create module=repo backend=memory status=error error_code=already_exists id={}",
                task.id
            );
            return Err(RepoError::AlreadyExists(task.id.clone()));
        }

        task.name = name;
        state.order.push(task.id.clone());
        state.tasks.insert(task.id.clone(), task.clone());

        debug!(
            "event=task_create module=repo backend=memory status=ok id={}",
            task.id
        );
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> RepoResult<Task> {
        require_id(id)?;

        self.lock()?
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }

    fn update(&self, id: &str, request: &UpdateRequest) -> RepoResult<()> {
        require_id(id)?;
        if request.is_empty() {
            return Err(RepoError::EmptyInput);
        }
        let name = match request.name.as_deref() {
            Some(raw) => Some(normalize_task_name(raw).ok_or(RepoError::EmptyName)?),
            None => None,
        };

        let mut state = self.lock()?;
        let task = state
            .tasks
            .get_mut(id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        if let Some(name) = name {
            task.name = name;
        }
        if let Some(description) = &request.description {
            task.description = description.clone();
        }
        if let Some(completed) = request.completed {
            task.completed = completed;
        }

        debug!("event=task_update module=repo backend=memory status=ok id={id}");
        Ok(())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        require_id(id)?;

        let mut state = self.lock()?;
        if state.tasks.remove(id).is_none() {
            return Err(RepoError::NotFound(id.to_string()));
        }
        state.order.retain(|existing| existing != id);

        debug!("event=task_delete module=repo backend=memory status=ok id={id}");
        Ok(())
    }

    fn list_all(&self) -> RepoResult<Vec<Task>> {
        let state = self.lock()?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.tasks.get(id))
            .cloned()
            .collect())
    }
}
