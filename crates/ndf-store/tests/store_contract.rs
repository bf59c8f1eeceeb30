use ndf_store::{EntityKind, FsStore, MemoryStore, RecordKey, Store};
use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn exercise(store: &dyn Store) {
    let node = RecordKey::user("ann", EntityKind::Node, "water");
    let view = RecordKey::graph("ann", "chem", EntityKind::Composed, "chem");

    store.save(&node, &json!({"id": "water"})).unwrap();
    store.save(&view, &json!({"nodes": [], "edges": []})).unwrap();

    assert_eq!(store.load(&node).unwrap(), Some(json!({"id": "water"})));
    assert_eq!(store.load(&view).unwrap(), Some(json!({"nodes": [], "edges": []})));
    assert_eq!(
        store
            .load(&RecordKey::graph("ann", "other", EntityKind::Composed, "chem"))
            .unwrap(),
        None
    );

    assert!(store.remove(&node).unwrap());
    assert_eq!(store.load(&node).unwrap(), None);
}

#[test]
fn test_memory_store_contract() {
    exercise(&MemoryStore::new());
}

#[test]
fn test_fs_store_contract() {
    let dir = TempDir::new().unwrap();
    exercise(&FsStore::new(dir.path()));
}

proptest! {
    #[test]
    fn prop_fs_store_returns_what_was_saved(
        id in "[a-z0-9_:]{1,24}",
        value in proptest::collection::vec(any::<i64>(), 0..8),
    ) {
        prop_assume!(id != "." && id != "..");
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        let key = RecordKey::user("ann", EntityKind::Attribute, id);
        let record = json!(value);

        store.save(&key, &record).unwrap();
        prop_assert_eq!(store.load(&key).unwrap(), Some(record));
    }
}
