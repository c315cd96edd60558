//! Core domain logic for the task store.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{AppConfig, BackendKind, ConfigError, ConfigOverrides};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::task::{CreateRequest, Task, TaskId, UpdateRequest};
pub use repo::memory_repo::MemoryTaskRepository;
pub use repo::sqlite_repo::SqliteTaskRepository;
pub use repo::{ErrorKind, RepoError, RepoResult, TaskRepository};
pub use service::task_service::TaskService;
pub use store::open_repository;
