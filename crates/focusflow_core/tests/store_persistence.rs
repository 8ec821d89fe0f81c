use focusflow_core::{
    FocusFlowData, KeyValueStore, LoadSource, ManualClock, MemoryKeyValueStore, NotePatch,
    SaveOutcome, SequentialIds, SqliteKeyValueStore, StorageError, StorageResult, Store,
    StoreConfig, StoreError, STORAGE_KEY,
};

fn store_on<S: KeyValueStore>(storage: S, clock: &ManualClock) -> Store<S> {
    Store::with_parts(
        storage,
        StoreConfig::default(),
        Box::new(clock.clone()),
        Box::new(SequentialIds::new("id")),
    )
}

fn stored(storage: &MemoryKeyValueStore) -> FocusFlowData {
    FocusFlowData::from_json(&storage.value(STORAGE_KEY).unwrap()).unwrap()
}

struct RejectingStorage;

impl KeyValueStore for RejectingStorage {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }
}

struct UnreadableStorage;

impl KeyValueStore for UnreadableStorage {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable("locked".to_string()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
        Ok(())
    }
}

#[test]
fn read_error_is_treated_as_missing_blob() {
    let clock = ManualClock::new(0);
    let mut store = store_on(UnreadableStorage, &clock);
    assert_eq!(store.load(), LoadSource::SeedAfterError);
    assert_eq!(store.data(), &FocusFlowData::seed(0));
    assert!(store.has_pending_save());
}

#[test]
fn burst_of_changes_is_written_once_with_final_state() {
    let clock = ManualClock::new(0);
    let storage = MemoryKeyValueStore::new();
    let mut store = store_on(storage.clone(), &clock);
    store.load();

    let mut last_todo = String::new();
    for index in 0..5 {
        clock.advance(300);
        last_todo = store.add_todo(format!("task {index}"), None);
        assert_eq!(store.tick(), SaveOutcome::Waiting);
    }
    assert_eq!(storage.write_count(), 0);

    clock.advance(999);
    assert_eq!(store.tick(), SaveOutcome::Waiting);
    clock.advance(1);
    assert_eq!(store.tick(), SaveOutcome::Saved);
    assert_eq!(store.tick(), SaveOutcome::Idle);

    assert_eq!(storage.write_count(), 1);
    let persisted = stored(&storage);
    assert_eq!(persisted.todos.len(), 6);
    assert_eq!(persisted.todos[0].id, last_todo);
    assert_eq!(&persisted, store.data());
}

#[test]
fn write_reads_state_at_fire_time() {
    let clock = ManualClock::new(0);
    let storage = MemoryKeyValueStore::new();
    let mut store = store_on(storage.clone(), &clock);
    store.load();
    let id = store.add_note();
    store.update_note(&id, NotePatch::title("draft"));
    store.update_note(&id, NotePatch::title("final"));

    assert_eq!(store.flush(), SaveOutcome::Saved);
    assert_eq!(stored(&storage).note(&id).unwrap().title, "final");
    assert_eq!(store.flush(), SaveOutcome::Idle);
}

#[test]
fn corrupted_blob_falls_back_to_seed() {
    let clock = ManualClock::new(0);
    let storage = MemoryKeyValueStore::with_entry(STORAGE_KEY, "{not json");
    let mut store = store_on(storage, &clock);

    assert!(!store.is_loaded());
    assert_eq!(store.load(), LoadSource::SeedAfterError);
    assert!(store.is_loaded());
    assert_eq!(store.data(), &FocusFlowData::seed(0));
}

#[test]
fn incompatible_blob_is_discarded_wholesale() {
    let clock = ManualClock::new(0);
    let storage = MemoryKeyValueStore::with_entry(
        STORAGE_KEY,
        r#"{"notes":[{"id":1}],"todos":[],"categories":[]}"#,
    );
    let mut store = store_on(storage, &clock);
    assert_eq!(store.load(), LoadSource::SeedAfterError);
    assert_eq!(store.data().notes[0].id, "welcome-note");
}

#[test]
fn stored_blob_is_loaded_once() {
    let clock = ManualClock::new(0);
    let mut data = FocusFlowData::default();
    data.todos.push(focusflow_core::Todo::new("t", "only", None, 5));
    let storage = MemoryKeyValueStore::with_entry(STORAGE_KEY, &data.to_json().unwrap());
    let mut store = store_on(storage, &clock);

    assert_eq!(store.load(), LoadSource::Stored);
    store.add_todo("second", None);
    assert_eq!(store.load(), LoadSource::Stored);
    assert_eq!(store.data().todos.len(), 2);
}

#[test]
fn update_note_merges_only_given_fields() {
    let clock = ManualClock::new(100);
    let mut store = store_on(MemoryKeyValueStore::new(), &clock);
    store.load();
    let untouched_id = store.add_note();
    let target_id = store.add_note();
    let before = store.snapshot();

    clock.advance(50);
    assert!(store.update_note(&target_id, NotePatch::title("X")));

    let original = before.note(&target_id).unwrap();
    let updated = store.data().note(&target_id).unwrap();
    assert_eq!(updated.title, "X");
    assert_eq!(updated.updated_at, 150);
    assert_eq!(updated.content, original.content);
    assert_eq!(updated.font_size, original.font_size);
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(store.data().note(&untouched_id), before.note(&untouched_id));
    assert_eq!(store.data().todos, before.todos);
}

#[test]
fn unknown_ids_are_silent_no_ops() {
    let clock = ManualClock::new(0);
    let mut store = store_on(MemoryKeyValueStore::new(), &clock);
    store.load();
    let revision = store.revision();

    assert!(!store.update_note("missing", NotePatch::title("x")));
    assert!(!store.toggle_todo("missing"));
    assert!(!store.delete_note("missing"));
    assert_eq!(store.revision(), revision);
}

#[test]
fn deleting_twice_equals_deleting_once() {
    let clock = ManualClock::new(0);
    let mut store = store_on(MemoryKeyValueStore::new(), &clock);
    store.load();
    let id = store.add_note();

    assert!(store.delete_note(&id));
    let after_once = store.snapshot();
    assert!(!store.delete_note(&id));
    assert_eq!(store.data(), &*after_once);
}

#[test]
fn reorder_by_permutation_keeps_members() {
    let clock = ManualClock::new(0);
    let mut store = store_on(MemoryKeyValueStore::new(), &clock);
    store.load();
    let a = store.add_todo("a", None);
    let b = store.add_todo("b", None);
    let seeded = "first-todo".to_string();

    let order = vec![seeded.clone(), a.clone(), b.clone()];
    store.reorder_todos_by_id(&order).unwrap();
    let ids: Vec<&str> = store.data().todos.iter().map(|todo| todo.id.as_str()).collect();
    assert_eq!(ids, vec![seeded.as_str(), a.as_str(), b.as_str()]);

    let err = store.reorder_todos_by_id(&[a.clone(), a]).unwrap_err();
    assert!(matches!(err, StoreError::InvalidReorder(_)));
}

#[test]
fn new_todos_and_notes_are_prepended() {
    let clock = ManualClock::new(0);
    let mut store = store_on(MemoryKeyValueStore::new(), &clock);
    store.load();
    let note = store.add_note_in_category(Some("cat-work"));
    let todo = store.add_todo("call", Some("cat-personal".to_string()));
    let category = store.add_category("Errands", "#FFB74D");

    assert_eq!(store.data().notes[0].id, note);
    assert_eq!(store.data().notes[0].category_id.as_deref(), Some("cat-work"));
    assert_eq!(store.data().todos[0].id, todo);
    assert!(!store.data().todos[0].completed);
    assert_eq!(store.data().categories.last().unwrap().id, category);

    assert!(store.toggle_todo(&todo));
    assert!(store.data().todos[0].completed);
}

#[test]
fn failed_save_is_recorded_and_not_retried() {
    let clock = ManualClock::new(0);
    let mut store = store_on(RejectingStorage, &clock);
    store.load();
    store.add_note();

    clock.advance(1_000);
    assert_eq!(store.tick(), SaveOutcome::Failed);
    assert!(matches!(
        store.last_save_error(),
        Some(StoreError::Storage(StorageError::Unavailable(_)))
    ));
    clock.advance(5_000);
    assert_eq!(store.tick(), SaveOutcome::Idle);
}

#[test]
fn sqlite_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focusflow.db");
    let clock = ManualClock::new(0);

    let note_id = {
        let mut store = store_on(SqliteKeyValueStore::open(&path).unwrap(), &clock);
        store.load();
        let id = store.add_note();
        store.update_note(&id, NotePatch::content("<div>persisted</div>"));
        assert_eq!(store.flush(), SaveOutcome::Saved);
        id
    };

    let mut reopened = store_on(SqliteKeyValueStore::open(&path).unwrap(), &clock);
    assert_eq!(reopened.load(), LoadSource::Stored);
    assert_eq!(
        reopened.data().note(&note_id).unwrap().content,
        "<div>persisted</div>"
    );
}
