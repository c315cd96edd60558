//! SQLite-backed task repository.
//!
//! # Responsibility
//! - Provide the task CRUD contract over the `tasks` table.
//! - Build partial-update statements from the fields actually present.
//!
//! # Invariants
//! - `id` and `created_at` are generated by the table on insert and read back
//!   with `RETURNING` in the same statement.
//! - Update SET fragments and bound values are built together in one pass;
//!   request values are always bound, never spliced into SQL text.
//! - An update without fields is rejected before any statement is issued.
//! - Update/delete detect missing ids through the affected-row count.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_version, latest_version};
use crate::db::{open_db, DbError};
use crate::model::task::{normalize_task_name, Task, UpdateRequest};
use crate::repo::{require_id, RepoError, RepoResult, TaskRepository};
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{ffi, params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    completed,
    created_at
FROM tasks";

/// SQLite-backed task repository.
///
/// Owns one connection behind a mutex so the repository can be shared across
/// threads; row-level concurrency beyond that is left to SQLite.
pub struct SqliteTaskRepository {
    conn: Mutex<Connection>,
}

impl SqliteTaskRepository {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `InvalidData` when the connection schema is older than this binary.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_schema_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (and migrates) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    fn conn(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RepoError::LockPoisoned("sqlite connection"))
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn create(&self, task: &mut Task) -> RepoResult<()> {
        let name = normalize_task_name(&task.name).ok_or(RepoError::EmptyName)?;

        let conn = self.conn()?;
        let (id, created_at): (String, i64) = conn
            .query_row(
                "INSERT INTO tasks (name, description, completed)
                 VALUES (?1, ?2, ?3)
                 RETURNING id, created_at;",
                params![name, task.description, bool_to_int(task.completed)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|err| classify_insert_error(&task.id, err))?;

        task.id = id;
        task.name = name;
        task.created_at = created_at;

        debug!(
            "event=task_create module=repo backend=sqlite status=ok id={}",
            task.id
        );
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> RepoResult<Task> {
        require_id(id)?;

        let conn = self.conn()?;
        let mut stmt = conn
            .prepare_cached(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))
            .map_err(|err| storage_failure("task_get", err))?;
        let task = stmt
            .query_row([id], |row| Ok(parse_task_row(row)))
            .optional()
            .map_err(|err| storage_failure("task_get", err))?;

        match task {
            Some(parsed) => parsed,
            None => Err(RepoError::NotFound(id.to_string())),
        }
    }

    fn update(&self, id: &str, request: &UpdateRequest) -> RepoResult<()> {
        require_id(id)?;
        let statement = build_update_statement(id, request)?;

        let conn = self.conn()?;
        let changed = conn
            .execute(&statement.sql, params_from_iter(statement.values))
            .map_err(|err| storage_failure("task_update", err))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        debug!(
            "event=task_update module=repo backend=sqlite status=ok id={id} columns={}",
            statement.columns.join(",")
        );
        Ok(())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        require_id(id)?;

        let conn = self.conn()?;
        let changed = conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id])
            .map_err(|err| storage_failure("task_delete", err))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        debug!("event=task_delete module=repo backend=sqlite status=ok id={id}");
        Ok(())
    }

    fn list_all(&self) -> RepoResult<Vec<Task>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare_cached(&format!("{TASK_SELECT_SQL};"))
            .map_err(|err| storage_failure("task_list", err))?;
        let mut rows = stmt
            .query([])
            .map_err(|err| storage_failure("task_list", err))?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next().map_err(|err| storage_failure("task_list", err))? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }
}

/// Parameterized `UPDATE` assembled from the present request fields.
#[derive(Debug, Clone, PartialEq)]
struct UpdateStatement {
    sql: String,
    values: Vec<Value>,
    columns: Vec<&'static str>,
}

/// Builds `UPDATE tasks SET ... WHERE id = ?N` for the present fields.
///
/// Columns appear in the fixed order name, description, completed, numbered
/// `?1..`, with the id bound last.
fn build_update_statement(id: &str, request: &UpdateRequest) -> RepoResult<UpdateStatement> {
    let mut columns: Vec<&'static str> = Vec::with_capacity(3);
    let mut values: Vec<Value> = Vec::with_capacity(4);

    if let Some(raw) = request.name.as_deref() {
        let name = normalize_task_name(raw).ok_or(RepoError::EmptyName)?;
        columns.push("name");
        values.push(Value::Text(name));
    }

    if let Some(description) = &request.description {
        columns.push("description");
        values.push(match description {
            Some(text) => Value::Text(text.clone()),
            None => Value::Null,
        });
    }

    if let Some(completed) = request.completed {
        columns.push("completed");
        values.push(Value::Integer(bool_to_int(completed)));
    }

    if columns.is_empty() {
        return Err(RepoError::EmptyInput);
    }

    let assignments = columns
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    values.push(Value::Text(id.to_string()));
    let sql = format!(
        "UPDATE tasks SET {assignments} WHERE id = ?{};",
        values.len()
    );

    Ok(UpdateStatement {
        sql,
        values,
        columns,
    })
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: String = row.get("id")?;

    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty name for task `{id}` in tasks.name"
        )));
    }

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` for task `{id}` in tasks.completed"
            )));
        }
    };

    Ok(Task {
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        id,
        name,
        completed,
    })
}

fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let version = current_version(conn)?;
    let required = latest_version();
    if version < required {
        return Err(RepoError::InvalidData(format!(
            "schema version {version} is older than required {required}; apply migrations first"
        )));
    }
    Ok(())
}

fn classify_insert_error(candidate_id: &str, err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY {
            return RepoError::AlreadyExists(candidate_id.to_string());
        }
    }
    storage_failure("task_create", err)
}

fn storage_failure(event: &'static str, err: rusqlite::Error) -> RepoError {
    error!(
        "event={event} module=repo backend=sqlite status=error error_code=sqlite_failed error={err}"
    );
    RepoError::Db(DbError::Sqlite(err))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::build_update_statement;
    use crate::model::task::UpdateRequest;
    use crate::repo::ErrorKind;
    use rusqlite::types::Value;

    #[test]
    fn single_field_update_binds_id_second() {
        let statement =
            build_update_statement("t1", &UpdateRequest::default().completed(true)).unwrap();
        assert_eq!(statement.sql, "UPDATE tasks SET completed = ?1 WHERE id = ?2;");
        assert_eq!(
            statement.values,
            vec![Value::Integer(1), Value::Text("t1".to_string())]
        );
    }

    #[test]
    fn columns_keep_stable_order_and_sequential_indices() {
        let request = UpdateRequest::default()
            .completed(false)
            .description("two liters")
            .name("  buy milk ");
        let statement = build_update_statement("t1", &request).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE tasks SET name = ?1, description = ?2, completed = ?3 WHERE id = ?4;"
        );
        assert_eq!(
            statement.values,
            vec![
                Value::Text("buy milk".to_string()),
                Value::Text("two liters".to_string()),
                Value::Integer(0),
                Value::Text("t1".to_string()),
            ]
        );
        assert_eq!(statement.columns, vec!["name", "description", "completed"]);
    }

    #[test]
    fn skipped_middle_column_does_not_leave_index_gaps() {
        let request = UpdateRequest::default().name("rename").completed(true);
        let statement = build_update_statement("abc", &request).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE tasks SET name = ?1, completed = ?2 WHERE id = ?3;"
        );
    }

    #[test]
    fn cleared_description_binds_null() {
        let request = UpdateRequest::default().clear_description();
        let statement = build_update_statement("t1", &request).unwrap();
        assert_eq!(statement.sql, "UPDATE tasks SET description = ?1 WHERE id = ?2;");
        assert_eq!(statement.values[0], Value::Null);
    }

    #[test]
    fn values_are_bound_not_spliced() {
        let request = UpdateRequest::default().name("x'; DROP TABLE tasks; --");
        let statement = build_update_statement("t1", &request).unwrap();
        assert!(!statement.sql.contains("DROP"));
        assert_eq!(
            statement.values[0],
            Value::Text("x'; DROP TABLE tasks; --".to_string())
        );
    }

    #[test]
    fn empty_request_is_rejected_before_any_sql() {
        let err = build_update_statement("t1", &UpdateRequest::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err =
            build_update_statement("t1", &UpdateRequest::default().name("   ").completed(true))
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyName);
    }
}
