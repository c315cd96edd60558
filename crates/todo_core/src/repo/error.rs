//! Shared error taxonomy for repositories and the task service.
//!
//! # Invariants
//! - Every `RepoError` maps to exactly one `ErrorKind`.
//! - Driver, data and lock failures all classify as `ErrorKind::Internal`.

use crate::db::DbError;
use crate::model::task::TaskId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Backend-agnostic error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyId,
    EmptyInput,
    EmptyName,
    NotFound,
    AlreadyExists,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyId => "empty_id",
            Self::EmptyInput => "empty_input",
            Self::EmptyName => "empty_name",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::Internal => "internal",
        }
    }

    /// HTTP status a transport layer should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::EmptyId | Self::EmptyInput | Self::EmptyName => 400,
            Self::NotFound => 404,
            Self::AlreadyExists => 409,
            Self::Internal => 500,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every repository and service operation.
#[derive(Debug)]
pub enum RepoError {
    /// An id argument was the empty string.
    EmptyId,
    /// A required request was absent or carried no fields.
    EmptyInput,
    /// A name was empty after trimming.
    EmptyName,
    NotFound(TaskId),
    AlreadyExists(TaskId),
    Db(DbError),
    /// Persisted row could not be decoded into a `Task`.
    InvalidData(String),
    /// A backend lock was poisoned by a panicking writer.
    LockPoisoned(&'static str),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyId => ErrorKind::EmptyId,
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::EmptyName => ErrorKind::EmptyName,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::Db(_) | Self::InvalidData(_) | Self::LockPoisoned(_) => ErrorKind::Internal,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id must not be empty"),
            Self::EmptyInput => write!(f, "request carries no data"),
            Self::EmptyName => write!(f, "task name must not be empty"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "task already exists: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::LockPoisoned(resource) => write!(f, "{resource} lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
