//! Command-line front end for the task store.
//!
//! # Responsibility
//! - Resolve configuration from `TODO_*` variables, with flags taking
//!   precedence.
//! - Map subcommands onto `TaskService` operations and print JSON.
//!
//! # Invariants
//! - Task output goes to stdout; errors and logs go to stderr.
//! - The backend is chosen once, before the first service call.

use clap::{Parser, Subcommand};
use log::error;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use todo_core::{
    init_logging_from_config, open_repository, AppConfig, ConfigOverrides, CreateRequest,
    RepoError, RepoResult, Task, TaskId, TaskRepository, TaskService, UpdateRequest,
};

const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Manage tasks stored in memory or SQLite")]
struct Cli {
    /// Storage backend: `memory` or `sqlite` (overrides TODO_BACKEND).
    #[arg(long, global = true)]
    backend: Option<String>,
    /// SQLite database file, or `:memory:` (overrides TODO_DB_PATH).
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    /// trace|debug|info|warn|error (overrides TODO_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files (overrides TODO_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a task.
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show one task.
    Get { id: String },
    /// List every task.
    List,
    /// Change only the given fields of a task.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Delete a task.
    Delete { id: String },
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            backend: self.backend.clone(),
            db_path: self.db_path.clone(),
            log_level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
        }
    }
}

#[derive(Debug)]
enum Output {
    Task(Task),
    Tasks(Vec<Task>),
    Deleted(TaskId),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    if let Err(err) = config.apply(cli.overrides()) {
        eprintln!("error: {err}");
        return ExitCode::from(EXIT_CONFIG);
    }
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("error: {err}");
        return ExitCode::from(EXIT_CONFIG);
    }

    let repo = match open_repository(&config) {
        Ok(repo) => repo,
        Err(err) => return report(&err),
    };
    let service = TaskService::new(repo);

    let output = match execute(&service, cli.command) {
        Ok(output) => output,
        Err(err) => return report(&err),
    };

    match render(&output) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: failed to encode output: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute<R: TaskRepository>(service: &TaskService<R>, command: Command) -> RepoResult<Output> {
    match command {
        Command::Create { name, description } => {
            let request = CreateRequest { name, description };
            service.create_todo(&request).map(Output::Task)
        }
        Command::Get { id } => service.get_by_id(&id).map(Output::Task),
        Command::List => service.get_all_todos().map(Output::Tasks),
        Command::Update {
            id,
            name,
            description,
            clear_description,
            completed,
        } => {
            let request = UpdateRequest {
                name,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                completed,
            };
            service.update_todo(&id, &request).map(Output::Task)
        }
        Command::Delete { id } => service.delete_todo(&id).map(|()| Output::Deleted(id)),
    }
}

fn render(output: &Output) -> serde_json::Result<String> {
    match output {
        Output::Task(task) => serde_json::to_string_pretty(task),
        Output::Tasks(tasks) => serde_json::to_string_pretty(tasks),
        Output::Deleted(id) => serde_json::to_string_pretty(&json!({ "deleted": id })),
    }
}

fn report(err: &RepoError) -> ExitCode {
    let kind = err.kind();
    error!(
        "event=cli_command module=cli status=error error_code={} error={err}",
        kind.as_str()
    );
    eprintln!(
        "{}",
        json!({
            "error": err.to_string(),
            "kind": kind.as_str(),
            "status": kind.http_status(),
        })
    );
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use super::{execute, render, Cli, Command, Output};
    use clap::{CommandFactory, Parser};
    use todo_core::{ErrorKind, MemoryTaskRepository, TaskService};

    fn run(service: &TaskService<MemoryTaskRepository>, args: &[&str]) -> Output {
        let cli = Cli::try_parse_from(std::iter::once("todo").chain(args.iter().copied())).unwrap();
        execute(service, cli.command).unwrap()
    }

    fn created_id(output: Output) -> String {
        match output {
            Output::Task(task) => task.id,
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_become_config_overrides() {
        let cli = Cli::try_parse_from(["todo", "list", "--backend", "memory", "--log-level", "warn"])
            .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.backend.as_deref(), Some("memory"));
        assert_eq!(overrides.log_level.as_deref(), Some("warn"));
        assert!(overrides.db_path.is_none());
    }

    #[test]
    fn description_and_clear_description_conflict() {
        let result = Cli::try_parse_from([
            "todo",
            "update",
            "t1",
            "--description",
            "x",
            "--clear-description",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn update_only_touches_given_fields() {
        let service = TaskService::new(MemoryTaskRepository::new());
        let id = created_id(run(&service, &["create", "buy milk", "--description", "2l"]));

        let output = run(&service, &["update", id.as_str(), "--completed", "true"]);
        let Output::Task(task) = output else {
            panic!("expected a task");
        };
        assert!(task.completed);
        assert_eq!(task.name, "buy milk");
        assert_eq!(task.description.as_deref(), Some("2l"));

        let output = run(&service, &["update", id.as_str(), "--clear-description"]);
        let Output::Task(task) = output else {
            panic!("expected a task");
        };
        assert!(task.description.is_none());
        assert!(task.completed);
    }

    #[test]
    fn update_without_fields_is_empty_input() {
        let service = TaskService::new(MemoryTaskRepository::new());
        let id = created_id(run(&service, &["create", "idle"]));

        let cli = Cli::try_parse_from(["todo", "update", id.as_str()]).unwrap();
        let err = execute(&service, cli.command).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
    }

    #[test]
    fn delete_renders_deleted_id() {
        let service = TaskService::new(MemoryTaskRepository::new());
        let id = created_id(run(&service, &["create", "short lived"]));

        let output = run(&service, &["delete", id.as_str()]);
        let text = render(&output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["deleted"], id.as_str());

        let cli = Cli::try_parse_from(["todo", "get", id.as_str()]).unwrap();
        assert!(matches!(cli.command, Command::Get { .. }));
        let err = execute(&service, cli.command).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
