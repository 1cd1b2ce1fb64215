use tracked_repo::{
    ContextError, EntityRepository, InMemoryStore, MemoryLogger, Repository, RepositoryError,
};

use crate::entities::Note;
use crate::scripted::{conflict, unavailable, ScriptedContext};

fn notes(n: u64) -> Vec<Note> {
    (1..=n).map(|id| Note::new(id, "note")).collect()
}

#[test]
fn insert_all_commits_once() {
    let store = InMemoryStore::new();
    let ctx = ScriptedContext::new(&store);
    let repo: Repository<Note, _> = Repository::with_context(ctx.clone());

    repo.insert_all(notes(5)).unwrap();

    assert_eq!(ctx.commits(), 1);
    assert_eq!(store.count::<Note>().unwrap(), 5);
}

#[test]
fn empty_insert_all_still_commits_once() {
    let store = InMemoryStore::new();
    let ctx = ScriptedContext::new(&store);
    let repo: Repository<Note, _> = Repository::with_context(ctx.clone());

    repo.insert_all(Vec::<Note>::new()).unwrap();
    repo.update_all(Vec::<Note>::new()).unwrap();

    assert_eq!(ctx.commits(), 2);
}

#[test]
fn single_item_operations_commit_once_each() {
    let store = InMemoryStore::new();
    let ctx = ScriptedContext::new(&store);
    let repo: Repository<Note, _> = Repository::with_context(ctx.clone());

    let note = Note::new(1, "x");
    repo.insert(&note).unwrap();
    repo.update(&note).unwrap();
    repo.delete(&note).unwrap();

    assert_eq!(ctx.commits(), 3);
}

#[test]
fn delete_all_commits_per_item() {
    let store = InMemoryStore::new();
    for note in notes(4) {
        store.seed(&note).unwrap();
    }
    let ctx = ScriptedContext::new(&store);
    let repo: Repository<Note, _> = Repository::with_context(ctx.clone());

    repo.delete_all(notes(4)).unwrap();

    assert_eq!(ctx.commits(), 4);
    assert_eq!(store.count::<Note>().unwrap(), 0);
}

#[test]
fn delete_all_of_nothing_never_commits() {
    let store = InMemoryStore::new();
    let ctx = ScriptedContext::new(&store);
    let repo: Repository<Note, _> = Repository::with_context(ctx.clone());

    repo.delete_all(Vec::<Note>::new()).unwrap();
    assert_eq!(ctx.commits(), 0);
}

#[test]
fn conflicts_are_translated_and_logged_once_per_commit() {
    let store = InMemoryStore::new();
    let ctx = ScriptedContext::new(&store).always_failing(conflict());
    let logger = MemoryLogger::new();
    let repo: Repository<Note, _> =
        Repository::with_context_and_logger(ctx.clone(), logger.clone());

    let note = Note::new(1, "x");
    let results = [
        repo.insert(&note),
        repo.update(&note),
        repo.delete(&note),
        repo.insert_all(notes(2)),
        repo.update_all(notes(2)),
        repo.delete_all(notes(2)),
    ];

    for result in results {
        let err = result.unwrap_err();
        assert!(err.is_concurrency_conflict(), "unexpected error: {}", err);
        assert_eq!(err.store_error(), Some(&conflict()));
    }

    // delete_all stops at its first failed commit
    assert_eq!(ctx.commits(), 6);
    assert_eq!(logger.len(), 6);
    assert!(logger.messages()[0].contains("concurrency conflict on notes:1"));
}

#[test]
fn other_failures_pass_through_unchanged() {
    let store = InMemoryStore::new();
    let ctx = ScriptedContext::new(&store).always_failing(unavailable());
    let logger = MemoryLogger::new();
    let repo: Repository<Note, _> =
        Repository::with_context_and_logger(ctx, logger.clone());

    let err = repo.insert(&Note::new(1, "x")).unwrap_err();

    assert_eq!(err, RepositoryError::Store(unavailable()));
    assert_eq!(err.to_string(), unavailable().to_string());
    assert_eq!(logger.messages(), vec![format!("[ERROR] {}", unavailable())]);
}

#[test]
fn delete_all_failure_keeps_earlier_deletes() {
    let store = InMemoryStore::new();
    for note in notes(3) {
        store.seed(&note).unwrap();
    }
    let ctx = ScriptedContext::new(&store).failing_from(2, unavailable());
    let repo: Repository<Note, _> = Repository::with_context(ctx.clone());

    let err = repo.delete_all(notes(3)).unwrap_err();

    assert_eq!(err, RepositoryError::Store(unavailable()));
    assert_eq!(ctx.commits(), 2);
    assert!(store.get::<Note>(1).unwrap().is_none());
    assert!(store.get::<Note>(2).unwrap().is_some());
    assert!(store.get::<Note>(3).unwrap().is_some());
}

#[test]
fn staging_fault_still_commits_what_was_staged() {
    let store = InMemoryStore::new();
    let ctx = ScriptedContext::new(&store).rejecting(2u64);
    let logger = MemoryLogger::new();
    let repo: Repository<Note, _> =
        Repository::with_context_and_logger(ctx.clone(), logger.clone());

    let err = repo.insert_all(notes(3)).unwrap_err();

    assert!(matches!(err, RepositoryError::Store(ContextError::Serde(_))));
    assert_eq!(ctx.commits(), 1);
    assert!(store.get::<Note>(1).unwrap().is_some());
    assert!(store.get::<Note>(2).unwrap().is_none());
    assert!(store.get::<Note>(3).unwrap().is_none());
    assert_eq!(logger.len(), 1);
}

#[test]
fn staging_fault_with_failed_commit_logs_once() {
    let store = InMemoryStore::new();
    let ctx = ScriptedContext::new(&store)
        .rejecting(2u64)
        .always_failing(unavailable());
    let logger = MemoryLogger::new();
    let repo: Repository<Note, _> =
        Repository::with_context_and_logger(ctx.clone(), logger.clone());

    let err = repo.insert_all(notes(2)).unwrap_err();

    assert_eq!(err, RepositoryError::Store(unavailable()));
    assert_eq!(ctx.commits(), 1);
    assert_eq!(logger.messages(), vec![format!("[ERROR] {}", unavailable())]);
    assert_eq!(store.count::<Note>().unwrap(), 0);
}

#[test]
fn repeated_key_in_batch_writes_nothing() {
    let store = InMemoryStore::new();
    let ctx = ScriptedContext::new(&store);
    let logger = MemoryLogger::new();
    let repo: Repository<Note, _> =
        Repository::with_context_and_logger(ctx.clone(), logger.clone());

    let err = repo
        .insert_all(vec![Note::new(1, "first"), Note::new(1, "second")])
        .unwrap_err();

    assert_eq!(
        err,
        RepositoryError::Store(ContextError::DuplicateKey {
            collection: "notes".into(),
            key: "1".into(),
        })
    );
    assert_eq!(ctx.commits(), 1);
    assert_eq!(logger.len(), 1);
    assert_eq!(store.count::<Note>().unwrap(), 0);
    assert!(store.get::<Note>(1).unwrap().is_none());
}

#[test]
fn conflict_propagates_through_callers() {
    fn rename_all(repo: &Repository<Note, ScriptedContext>) -> Result<usize, RepositoryError> {
        repo.update_all(notes(2))?;
        Ok(2)
    }

    let store = InMemoryStore::new();
    let ctx = ScriptedContext::new(&store).always_failing(conflict());
    let repo = Repository::with_context(ctx);

    let err = rename_all(&repo).unwrap_err();
    assert!(matches!(err, RepositoryError::ConcurrencyConflict(_)));
}
