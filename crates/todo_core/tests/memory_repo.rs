use std::sync::Arc;
use std::thread;
use todo_core::{ErrorKind, MemoryTaskRepository, RepoError, Task, TaskRepository, UpdateRequest};

#[test]
fn synthetic_id_lifecycle_scenario() {
    let repo = MemoryTaskRepository::new();

    let mut task = Task::with_id("t1", "buy milk");
    repo.create(&mut task).unwrap();
    assert_eq!(task.id, "t1");
    assert!(!task.completed);

    let loaded = repo.get_by_id("t1").unwrap();
    assert_eq!(loaded, task);

    repo.update("t1", &UpdateRequest::default().completed(true))
        .unwrap();
    let updated = repo.get_by_id("t1").unwrap();
    assert!(updated.completed);
    assert_eq!(updated.name, "buy milk");
    assert_eq!(updated.created_at, task.created_at);

    repo.delete("t1").unwrap();
    let err = repo.get_by_id("t1").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "t1"));
}

#[test]
fn create_requires_caller_id() {
    let repo = MemoryTaskRepository::new();

    let mut task = Task::with_id("", "no id");
    let err = repo.create(&mut task).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyId);
    assert!(repo.is_empty().unwrap());
}

#[test]
fn create_rejects_blank_name_and_stores_trimmed_name() {
    let repo = MemoryTaskRepository::new();

    let mut blank = Task::with_id("t1", "   ");
    assert_eq!(repo.create(&mut blank).unwrap_err().kind(), ErrorKind::EmptyName);
    assert!(repo.is_empty().unwrap());

    let mut padded = Task::with_id("t2", "  call mom  ");
    repo.create(&mut padded).unwrap();
    assert_eq!(padded.name, "call mom");
    assert_eq!(repo.get_by_id("t2").unwrap().name, "call mom");
}

#[test]
fn duplicate_id_is_rejected_and_original_is_untouched() {
    let repo = MemoryTaskRepository::new();

    let mut original = Task::with_id("t1", "original");
    original.description = Some("keep me".to_string());
    repo.create(&mut original).unwrap();

    let mut duplicate = Task::with_id("t1", "impostor");
    let err = repo.create(&mut duplicate).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyExists(ref id) if id == "t1"));
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    assert_eq!(repo.get_by_id("t1").unwrap(), original);
    assert_eq!(repo.len().unwrap(), 1);
}

#[test]
fn empty_id_is_rejected_everywhere() {
    let repo = MemoryTaskRepository::new();
    let request = UpdateRequest::default().completed(true);

    assert_eq!(repo.get_by_id("").unwrap_err().kind(), ErrorKind::EmptyId);
    assert_eq!(repo.update("", &request).unwrap_err().kind(), ErrorKind::EmptyId);
    assert_eq!(repo.delete("").unwrap_err().kind(), ErrorKind::EmptyId);
}

#[test]
fn unknown_ids_return_not_found() {
    let repo = MemoryTaskRepository::new();
    let request = UpdateRequest::default().name("renamed");

    assert_eq!(repo.get_by_id("missing").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(
        repo.update("missing", &request).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(repo.delete("missing").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn empty_update_is_rejected_and_leaves_task_unchanged() {
    let repo = MemoryTaskRepository::new();
    let mut task = Task::with_id("t1", "stay");
    repo.create(&mut task).unwrap();

    let err = repo.update("t1", &UpdateRequest::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyInput);
    assert_eq!(repo.get_by_id("t1").unwrap(), task);
}

#[test]
fn blank_name_update_applies_nothing() {
    let repo = MemoryTaskRepository::new();
    let mut task = Task::with_id("t1", "stay");
    repo.create(&mut task).unwrap();

    let request = UpdateRequest::default().name("  ").completed(true);
    let err = repo.update("t1", &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyName);

    let loaded = repo.get_by_id("t1").unwrap();
    assert!(!loaded.completed);
    assert_eq!(loaded.name, "stay");
}

#[test]
fn description_can_be_set_kept_and_cleared() {
    let repo = MemoryTaskRepository::new();
    let mut task = Task::with_id("t1", "notes");
    repo.create(&mut task).unwrap();

    repo.update("t1", &UpdateRequest::default().description("first"))
        .unwrap();
    repo.update("t1", &UpdateRequest::default().completed(true))
        .unwrap();
    assert_eq!(
        repo.get_by_id("t1").unwrap().description.as_deref(),
        Some("first")
    );

    repo.update("t1", &UpdateRequest::default().clear_description())
        .unwrap();
    assert!(repo.get_by_id("t1").unwrap().description.is_none());
}

#[test]
fn delete_twice_returns_not_found() {
    let repo = MemoryTaskRepository::new();
    let mut task = Task::with_id("t1", "once");
    repo.create(&mut task).unwrap();

    repo.delete("t1").unwrap();
    assert_eq!(repo.delete("t1").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn list_preserves_insertion_order_across_deletes() {
    let repo = MemoryTaskRepository::new();
    assert!(repo.list_all().unwrap().is_empty());

    for id in ["c", "a", "b", "d"] {
        let mut task = Task::with_id(id, format!("task {id}"));
        repo.create(&mut task).unwrap();
    }
    repo.delete("a").unwrap();

    let ids: Vec<String> = repo.list_all().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["c", "b", "d"]);
}

#[test]
fn concurrent_creates_all_land() {
    let repo = Arc::new(MemoryTaskRepository::new());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                for index in 0..50 {
                    let mut task = Task::new(format!("worker {worker} task {index}"));
                    repo.create(&mut task).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(repo.len().unwrap(), 400);
    assert_eq!(repo.list_all().unwrap().len(), 400);
}

#[test]
fn readers_never_observe_torn_updates() {
    let repo = Arc::new(MemoryTaskRepository::new());
    let mut task = Task::with_id("t1", "open");
    repo.create(&mut task).unwrap();

    let writer = {
        let repo = Arc::clone(&repo);
        thread::spawn(move || {
            for round in 0..500 {
                let request = if round % 2 == 0 {
                    UpdateRequest::default().name("done").completed(true)
                } else {
                    UpdateRequest::default().name("open").completed(false)
                };
                repo.update("t1", &request).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                for _ in 0..500 {
                    let seen = repo.get_by_id("t1").unwrap();
                    assert_eq!(seen.completed, seen.name == "done");
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}
