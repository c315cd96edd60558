//! Startup backend selection.
//!
//! # Responsibility
//! - Build the one repository a process runs with, from configuration.
//!
//! # Invariants
//! - Exactly one backend is constructed per call; nothing is shared between
//!   backends.

use crate::config::{AppConfig, BackendKind};
use crate::repo::memory_repo::MemoryTaskRepository;
use crate::repo::sqlite_repo::SqliteTaskRepository;
use crate::repo::{RepoResult, TaskRepository};
use log::info;

/// Opens the repository selected by `config.backend`.
///
/// # Errors
/// - Database open/migration failures for the SQLite backend.
pub fn open_repository(config: &AppConfig) -> RepoResult<Box<dyn TaskRepository>> {
    let repo: Box<dyn TaskRepository> = match config.backend {
        BackendKind::Memory => Box::new(MemoryTaskRepository::new()),
        BackendKind::Sqlite => Box::new(SqliteTaskRepository::open(&config.db_path)?),
    };

    info!(
        "event=store_open module=store status=ok backend={} db_path={}",
        config.backend.as_str(),
        config.db_path.display()
    );
    Ok(repo)
}
