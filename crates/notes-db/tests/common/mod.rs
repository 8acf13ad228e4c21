//! Behaviour every `NoteStore` backend must share.

use std::sync::Arc;

use chrono::Duration;
use notes_db::{now_millis, CreateNoteRequest, Error, Note, NoteStore, UpdateNoteRequest};
use uuid::Uuid;

pub fn sample(title: &str, content: &str) -> Note {
    Note::new(CreateNoteRequest::new(title, content)).expect("valid note")
}

/// Run the full contract against a store that starts empty.
pub async fn assert_store_contract(store: &dyn NoteStore) {
    assert!(store.read_all().await.unwrap().is_empty());
    assert!(store.fetch(Uuid::new_v4()).await.unwrap().is_none());

    // insert + fetch
    let first = sample("First", "alpha");
    let second = sample("Second", "beta");
    store.insert(&first).await.unwrap();
    store.insert(&second).await.unwrap();

    let fetched = store.fetch(first.id).await.unwrap().expect("first stored");
    assert_eq!(fetched, first);
    assert_eq!(store.read_all().await.unwrap().len(), 2);

    // ids are unique: a second insert with a taken id is a conflict
    let mut twin = sample("Twin", "same id");
    twin.id = second.id;
    let err = store.insert(&twin).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "{err}");
    assert_eq!(store.read_all().await.unwrap().len(), 2);
    assert_eq!(store.fetch(second.id).await.unwrap().unwrap(), second);

    // update merges only the supplied fields
    let later = first.updated_at + Duration::seconds(1);
    let edited = store
        .update(first.id, &title_only("First (edited)"), later)
        .await
        .unwrap()
        .expect("first stored");
    assert_eq!(edited.title, "First (edited)");
    assert_eq!(edited.content, "alpha");
    assert_eq!(edited.created_at, first.created_at);
    assert_eq!(edited.updated_at, later);
    assert_eq!(store.fetch(first.id).await.unwrap().unwrap(), edited);

    // a stale clock still moves updated_at forward
    let content_only = UpdateNoteRequest {
        title: None,
        content: Some("alpha 2".to_string()),
    };
    let bumped = store
        .update(first.id, &content_only, first.created_at)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bumped.title, "First (edited)");
    assert_eq!(bumped.content, "alpha 2");
    assert_eq!(bumped.updated_at, later + Duration::milliseconds(1));

    // a blank field is rejected and nothing changes
    let err = store
        .update(first.id, &title_only("  "), later)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(store.fetch(first.id).await.unwrap().unwrap(), bumped);

    assert!(store
        .update(Uuid::new_v4(), &title_only("Ghost"), later)
        .await
        .unwrap()
        .is_none());

    // write_all(read_all()) is idempotent
    let before = sorted(store.read_all().await.unwrap());
    store.write_all(&before).await.unwrap();
    let after = sorted(store.read_all().await.unwrap());
    assert_eq!(before, after);

    // write_all refuses a set with duplicate ids and keeps the old one
    let doubled = vec![bumped.clone(), bumped.clone()];
    let err = store.write_all(&doubled).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "{err}");
    assert_eq!(sorted(store.read_all().await.unwrap()), before);

    // delete
    assert!(store.delete(second.id).await.unwrap());
    assert!(!store.delete(second.id).await.unwrap());
    assert!(store.fetch(second.id).await.unwrap().is_none());
    assert_eq!(store.read_all().await.unwrap().len(), 1);

    // write_all replaces the whole set
    let replacement = vec![sample("Only", "one")];
    store.write_all(&replacement).await.unwrap();
    assert_eq!(store.read_all().await.unwrap(), replacement);

    store.ping().await.unwrap();
}

/// Race a title-only update against a content-only update on one note and
/// check that both changes are kept.
pub async fn assert_partial_updates_both_survive(store: Arc<dyn NoteStore>) {
    let note = sample("t0", "c0");
    store.insert(&note).await.unwrap();
    let id = note.id;

    let title_task = {
        let store = store.clone();
        tokio::spawn(async move { store.update(id, &title_only("t1"), now_millis()).await })
    };
    let content_task = {
        let store = store.clone();
        let changes = UpdateNoteRequest {
            title: None,
            content: Some("c1".to_string()),
        };
        tokio::spawn(async move { store.update(id, &changes, now_millis()).await })
    };
    assert!(title_task.await.unwrap().unwrap().is_some());
    assert!(content_task.await.unwrap().unwrap().is_some());

    let stored = store.fetch(id).await.unwrap().unwrap();
    assert_eq!(stored.title, "t1");
    assert_eq!(stored.content, "c1");
    assert!(stored.updated_at > note.updated_at);
}

pub fn title_only(title: &str) -> UpdateNoteRequest {
    UpdateNoteRequest {
        title: Some(title.to_string()),
        content: None,
    }
}

fn sorted(mut notes: Vec<Note>) -> Vec<Note> {
    notes.sort_by_key(|n| n.id);
    notes
}
