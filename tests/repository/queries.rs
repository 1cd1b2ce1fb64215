use tracked_repo::{EntityRepository, EntitySetsExt, InMemoryStore, Repository};

use crate::entities::Note;
use crate::scripted::ScriptedContext;

fn seeded() -> InMemoryStore {
    let store = InMemoryStore::new();
    for (id, body) in [(1, "groceries"), (2, "gym"), (3, "garden"), (4, "taxes")] {
        store.seed(&Note::new(id, body)).unwrap();
    }
    store
}

#[test]
fn queryable_composes_and_never_commits() {
    let store = seeded();
    let ctx = ScriptedContext::new(&store);
    let notes: Repository<Note, _> = Repository::with_context(ctx.clone());

    let bodies = notes
        .queryable()
        .unwrap()
        .filter(|n| n.body.starts_with('g'))
        .order_by_key(|n| n.body.clone())
        .select(|n| n.body)
        .unwrap();

    assert_eq!(bodies, vec!["garden", "groceries", "gym"]);
    assert_eq!(ctx.commits(), 0);
}

#[test]
fn paging_and_terminals() {
    let store = seeded();
    let notes: Repository<Note, _> = Repository::with_context(store.context());

    let query = notes.queryable().unwrap().order_by(|a, b| b.id.cmp(&a.id));
    assert_eq!(query.first().unwrap().unwrap().id, 4);

    let page = notes
        .queryable()
        .unwrap()
        .skip(1)
        .take(2)
        .select(|n| n.id)
        .unwrap();
    assert_eq!(page, vec![2, 3]);

    assert_eq!(notes.queryable().unwrap().count().unwrap(), 4);
    assert!(notes
        .queryable()
        .unwrap()
        .filter(|n| n.id == 3)
        .exists()
        .unwrap());
}

#[test]
fn queries_read_committed_rows_only() {
    let store = seeded();
    let ctx = store.context();
    let notes: Repository<Note, _> = Repository::with_context(ctx.clone());

    ctx.set::<Note>().add(&Note::new(5, "staged only")).unwrap();

    assert_eq!(notes.queryable().unwrap().count().unwrap(), 4);

    notes.insert(&Note::new(6, "committed")).unwrap();
    // the staged note went out with that commit too
    assert_eq!(notes.queryable().unwrap().count().unwrap(), 6);
}
