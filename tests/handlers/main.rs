//! Integration tests for delegated handlers persisting through repositories.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracked_repo::handler::{DelegatedHandler, Dispatcher, Handler, HandlerError};
use tracked_repo::{
    Entity, EntityRepository, InMemoryContext, InMemoryStore, Repository, RepositoryError,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Entity)]
#[entity(collection = "audit_entries")]
struct AuditEntry {
    #[entity(key)]
    id: u64,
    action: String,
}

#[derive(Debug, Clone)]
struct NoteCreated {
    id: u64,
}

struct AuditHandler {
    entries: Repository<AuditEntry, InMemoryContext>,
}

impl Handler<NoteCreated> for AuditHandler {
    fn handle(&self, message: &NoteCreated) -> Result<(), HandlerError> {
        self.entries.insert(&AuditEntry {
            id: message.id,
            action: "note.created".into(),
        })?;
        Ok(())
    }
}

fn ignore(_: &NoteCreated) -> Result<(), HandlerError> {
    Ok(())
}

#[test]
fn handler_persists_through_repository() {
    let store = InMemoryStore::new();
    let audit = Arc::new(AuditHandler {
        entries: Repository::with_context(store.context()),
    });

    let mut dispatcher = Dispatcher::new();
    assert!(dispatcher.subscribe_handler(Arc::clone(&audit)));
    assert!(!dispatcher.subscribe_handler(Arc::clone(&audit)));

    assert_eq!(dispatcher.publish(&NoteCreated { id: 7 }).unwrap(), 1);
    assert_eq!(
        store.get::<AuditEntry>(7).unwrap().map(|e| e.action),
        Some("note.created".to_string())
    );
}

#[test]
fn repository_errors_surface_from_publish() {
    let store = InMemoryStore::new();
    store
        .seed(&AuditEntry {
            id: 1,
            action: "existing".into(),
        })
        .unwrap();

    let mut dispatcher = Dispatcher::new();
    dispatcher.subscribe_handler(Arc::new(AuditHandler {
        entries: Repository::with_context(store.context()),
    }));

    let err = dispatcher.publish(&NoteCreated { id: 1 }).unwrap_err();
    match err {
        HandlerError::Repository(RepositoryError::Store(inner)) => {
            assert!(inner.to_string().contains("duplicate key audit_entries:1"))
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn function_handlers_deduplicate() {
    let mut dispatcher = Dispatcher::new();
    assert!(dispatcher.subscribe(DelegatedHandler::from_fn(ignore)));
    assert!(!dispatcher.subscribe(DelegatedHandler::from_fn(ignore)));

    let closure = dispatcher.subscribe_fn(|_: &NoteCreated| Ok(()));
    assert_eq!(dispatcher.len(), 2);

    assert!(dispatcher.unsubscribe(&DelegatedHandler::from_fn(ignore)));
    assert!(dispatcher.contains(&closure));
    assert_eq!(dispatcher.publish(&NoteCreated { id: 1 }).unwrap(), 1);
}
