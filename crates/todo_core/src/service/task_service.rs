//! Task use-case service.
//!
//! # Responsibility
//! - Normalize create input and assign identity before persistence.
//! - Return the authoritative post-update task by re-reading after writes.
//!
//! # Invariants
//! - The service never branches on which backend it wraps.
//! - Repository errors are forwarded unchanged; the only error raised here is
//!   `EmptyName` for blank create input.
//! - A failed update returns immediately without the follow-up read.

use crate::model::task::{normalize_task_name, CreateRequest, Task, UpdateRequest};
use crate::repo::{RepoError, RepoResult, TaskRepository};
use log::debug;

/// Use-case service wrapper for task CRUD operations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the wrapped repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates a task from user input.
    ///
    /// # Contract
    /// - Blank or missing names fail with `EmptyName` before any repository call.
    /// - The candidate gets a UUID v4 id, `completed = false` and the current
    ///   time; backends that generate their own id/timestamp overwrite them.
    pub fn create_todo(&self, request: &CreateRequest) -> RepoResult<Task> {
        let name = normalize_task_name(&request.name).ok_or(RepoError::EmptyName)?;

        let mut task = Task::new(name);
        task.description = request.description.clone();
        self.repo.create(&mut task)?;

        debug!("event=todo_create module=service status=ok id={}", task.id);
        Ok(task)
    }

    pub fn get_by_id(&self, id: &str) -> RepoResult<Task> {
        self.repo.get_by_id(id)
    }

    pub fn get_all_todos(&self) -> RepoResult<Vec<Task>> {
        self.repo.list_all()
    }

    /// Applies a partial update and returns the stored result.
    pub fn update_todo(&self, id: &str, request: &UpdateRequest) -> RepoResult<Task> {
        self.repo.update(id, request)?;
        self.repo.get_by_id(id)
    }

    pub fn delete_todo(&self, id: &str) -> RepoResult<()> {
        self.repo.delete(id)
    }
}
