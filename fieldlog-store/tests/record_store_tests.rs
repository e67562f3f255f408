use fieldlog_store::{RecordStore, StoreError};
use fieldlog_types::{FieldMap, SyncState};
use serde_json::json;

fn fields(pairs: &[(&str, &str)]) -> FieldMap {
    let mut map = FieldMap::new();
    for (name, value) in pairs {
        map.insert((*name).to_string(), json!(value));
    }
    map
}

fn open_store() -> RecordStore {
    let store = RecordStore::in_memory();
    store.open().unwrap();
    store
}

// ── open ─────────────────────────────────────────────────────────

#[test]
fn open_is_idempotent() {
    let store = RecordStore::in_memory();
    assert!(!store.is_ready());

    store.open().unwrap();
    assert!(store.is_ready());

    store.open().unwrap();
    assert!(store.is_ready());
}

#[test]
fn mutations_fail_before_open() {
    let store = RecordStore::in_memory();
    let err = store.put("machinery", &fields(&[("name", "Loader")])).unwrap_err();
    assert!(matches!(err, StoreError::Unavailable));

    let err = store.list_all("machinery").unwrap_err();
    assert!(matches!(err, StoreError::Unavailable));
}

// ── put / list ───────────────────────────────────────────────────

#[test]
fn put_assigns_identity_and_stamps() {
    let store = open_store();
    let record = store.put("machinery", &fields(&[("name", "Loader")])).unwrap();

    assert!(record.id.is_some());
    assert!(record.created_at.is_some());
    assert_eq!(record.sync_state, SyncState::Unsynced);
    assert_eq!(record.get_str("name"), Some("Loader"));
}

#[test]
fn list_all_preserves_insertion_order() {
    let store = open_store();
    let first = store.put("machinery", &fields(&[("name", "A")])).unwrap();
    let second = store.put("machinery", &fields(&[("name", "B")])).unwrap();
    let third = store.put("machinery", &fields(&[("name", "C")])).unwrap();

    let all = store.list_all("machinery").unwrap();
    let ids: Vec<_> = all.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
}

#[test]
fn modules_are_isolated_collections() {
    let store = open_store();
    store.put("machinery", &fields(&[("name", "Loader")])).unwrap();
    store.put("maintenance", &fields(&[("machine", "Loader")])).unwrap();

    assert_eq!(store.list_all("machinery").unwrap().len(), 1);
    assert_eq!(store.list_all("maintenance").unwrap().len(), 1);
    assert_eq!(store.list_all("inventory").unwrap().len(), 0);
}

// ── update ───────────────────────────────────────────────────────

#[test]
fn update_merges_fields_shallowly() {
    let store = open_store();
    let record = store
        .put("machinery", &fields(&[("name", "Loader"), ("status", "operational")]))
        .unwrap();
    let id = record.id.unwrap();

    let updated = store
        .update("machinery", id, &fields(&[("status", "in repair")]))
        .unwrap();

    assert_eq!(updated.get_str("name"), Some("Loader"));
    assert_eq!(updated.get_str("status"), Some("in repair"));
    assert_eq!(updated.sync_state, SyncState::Unsynced);
    assert_eq!(updated.created_at, record.created_at);
}

#[test]
fn update_missing_record_is_not_found() {
    let store = open_store();
    let err = store
        .update("machinery", 999.into(), &fields(&[("status", "idle")]))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn update_is_scoped_to_the_module() {
    let store = open_store();
    let record = store.put("machinery", &fields(&[("name", "Loader")])).unwrap();

    let err = store
        .update("maintenance", record.id.unwrap(), &fields(&[("name", "x")]))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

// ── remove ───────────────────────────────────────────────────────

#[test]
fn remove_is_idempotent() {
    let store = open_store();
    let record = store.put("machinery", &fields(&[("name", "Loader")])).unwrap();
    let id = record.id.unwrap();

    store.remove("machinery", id).unwrap();
    assert!(store.list_all("machinery").unwrap().is_empty());

    store.remove("machinery", id).unwrap();
    store.remove("machinery", 12345.into()).unwrap();
}

// ── queue derivation ─────────────────────────────────────────────

#[test]
fn unsynced_listing_is_the_filtered_scan() {
    let store = open_store();
    store.put("machinery", &fields(&[("name", "A")])).unwrap();
    store.put("machinery", &fields(&[("name", "B")])).unwrap();

    let all = store.list_all("machinery").unwrap();
    let queue = store.list_unsynced("machinery").unwrap();

    let filtered: Vec<_> = all.into_iter().filter(|r| r.is_pending()).collect();
    assert_eq!(queue, filtered);
}

#[test]
fn queue_grows_with_puts_and_shrinks_with_removes() {
    let store = open_store();
    assert_eq!(store.list_unsynced("machinery").unwrap().len(), 0);

    let record = store.put("machinery", &fields(&[("name", "Loader")])).unwrap();
    assert_eq!(store.list_unsynced("machinery").unwrap().len(), 1);

    store.remove("machinery", record.id.unwrap()).unwrap();
    assert_eq!(store.list_unsynced("machinery").unwrap().len(), 0);
}

// ── durability ───────────────────────────────────────────────────

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.db");

    {
        let store = RecordStore::new(&path);
        store.open().unwrap();
        store.put("machinery", &fields(&[("name", "Loader")])).unwrap();
    }

    let store = RecordStore::new(&path);
    store.open().unwrap();
    let all = store.list_all("machinery").unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].get_str("name"), Some("Loader"));
    assert_eq!(all[0].sync_state, SyncState::Unsynced);
}
