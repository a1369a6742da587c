use statebox_core::db::open_db;
use statebox_core::{
    Cart, CartService, Collection, CorruptSnapshotPolicy, FileStorage, LoadOutcome,
    MemoryStorage, SnapshotStorage, SqliteStorage, StoreConfig, StoreError,
};

#[test]
fn repeated_add_scenario_yields_quantity_two() {
    let mut cart = CartService::open(MemoryStorage::new()).unwrap();

    cart.add("book-1").unwrap();
    cart.add("book-1").unwrap();

    let json = serde_json::to_value(cart.get_all()).unwrap();
    assert_eq!(json, serde_json::json!({ "book-1": 2 }));
}

#[test]
fn distinct_adds_each_have_quantity_one() {
    let mut cart = CartService::open(MemoryStorage::new()).unwrap();
    let items = ["book-1", "book-2", "pen", "lamp", "mug"];
    for item in items {
        cart.add(item).unwrap();
    }

    let all = cart.get_all();
    assert_eq!(all.len(), items.len());
    for item in items {
        assert_eq!(all.quantity(item), 1, "quantity for {item}");
    }
}

#[test]
fn repeated_adds_accumulate() {
    for repeats in [1_u32, 2, 7, 40] {
        let mut cart = CartService::open(MemoryStorage::new()).unwrap();
        for _ in 0..repeats {
            cart.add("book-1").unwrap();
        }
        assert_eq!(cart.quantity("book-1"), repeats);
    }
}

#[test]
fn reload_from_memory_storage_reproduces_cart() {
    let storage = MemoryStorage::new();
    let mut cart = CartService::open(storage.clone()).unwrap();
    cart.add("a").unwrap();
    cart.add("b").unwrap();
    cart.add("b").unwrap();
    cart.decrement("a").unwrap();

    let reloaded = CartService::open(storage).unwrap();
    assert_eq!(reloaded.load_outcome(), &LoadOutcome::Restored);
    assert_eq!(reloaded.get_all(), cart.get_all());
}

#[test]
fn reload_from_file_storage_reproduces_cart() {
    let dir = tempfile::tempdir().unwrap();
    let expected: Cart = {
        let mut cart = CartService::open(FileStorage::open(dir.path()).unwrap()).unwrap();
        cart.add("book-1").unwrap();
        cart.add("book-2").unwrap();
        cart.add("book-1").unwrap();
        cart.get_all()
    };

    let reloaded = CartService::open(FileStorage::open(dir.path()).unwrap()).unwrap();
    assert_eq!(reloaded.get_all(), expected);
}

#[test]
fn reload_from_sqlite_storage_reproduces_cart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statebox.sqlite3");

    let expected = {
        let conn = open_db(&path).unwrap();
        let storage = SqliteStorage::try_new(&conn).unwrap();
        let mut cart = CartService::open(storage).unwrap();
        cart.add("book-1").unwrap();
        cart.add("book-3").unwrap();
        cart.remove("book-3").unwrap();
        cart.get_all()
    };

    let conn = open_db(&path).unwrap();
    let reloaded = CartService::open(SqliteStorage::try_new(&conn).unwrap()).unwrap();
    assert_eq!(reloaded.get_all(), expected);
    assert_eq!(reloaded.quantity("book-1"), 1);
}

#[test]
fn failed_mutation_does_not_touch_storage() {
    let storage = MemoryStorage::new();
    let mut cart = CartService::open(storage.clone()).unwrap();
    cart.add("kept").unwrap();
    let before = storage.raw("cart");

    assert!(cart.decrement("missing").is_err());
    assert!(cart.add("   ").is_err());
    assert_eq!(storage.raw("cart"), before);
}

#[test]
fn separate_keys_do_not_interfere() {
    let storage = MemoryStorage::new();
    let mut cart = CartService::open(storage.clone()).unwrap();
    let mut wishlist = CartService::open_with_config(
        storage.clone(),
        StoreConfig::default().with_storage_key("wishlist"),
    )
    .unwrap();

    cart.add("book-1").unwrap();
    wishlist.add("book-9").unwrap();

    assert_eq!(storage.load("cart").unwrap().as_deref(), Some(r#"{"book-1":1}"#));
    assert_eq!(
        storage.load("wishlist").unwrap().as_deref(),
        Some(r#"{"book-9":1}"#)
    );
}

#[test]
fn corrupt_snapshot_is_distinguished_from_missing_data() {
    let storage = MemoryStorage::new();
    storage.insert_raw("cart", "[1, 2");

    let lenient = CartService::open(storage.clone()).unwrap();
    match lenient.load_outcome() {
        LoadOutcome::Recovered { reason } => assert!(!reason.is_empty()),
        other => panic!("unexpected outcome: {other:?}"),
    }

    let strict = CartService::open_with_config(
        storage,
        StoreConfig::default().with_corrupt_policy(CorruptSnapshotPolicy::Reject),
    );
    assert!(matches!(
        strict.err().unwrap(),
        StoreError::CorruptSnapshot { .. }
    ));
}

#[test]
fn first_mutation_after_recovery_overwrites_corrupt_payload() {
    let storage = MemoryStorage::new();
    storage.insert_raw("cart", "garbage");

    let mut cart = CartService::open(storage.clone()).unwrap();
    cart.add("fresh").unwrap();

    assert_eq!(storage.raw("cart").as_deref(), Some(r#"{"fresh":1}"#));
}

#[test]
fn non_utf8_snapshot_file_follows_corrupt_policy() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    std::fs::write(storage.path_for("cart"), b"{\"book-\xff\":2}").unwrap();

    let strict = CartService::open_with_config(
        storage.clone(),
        StoreConfig::default().with_corrupt_policy(CorruptSnapshotPolicy::Reject),
    );
    assert!(matches!(
        strict.err().unwrap(),
        StoreError::CorruptSnapshot { ref key, .. } if key == "cart"
    ));

    let lenient = CartService::open(storage).unwrap();
    assert!(matches!(lenient.load_outcome(), LoadOutcome::Recovered { .. }));
    assert!(lenient.get_all().is_empty());
}

#[test]
fn colliding_item_ids_are_corrupt_not_merged() {
    for payload in [r#"{"a":1," a ":5}"#, r#"{"a":1,"a":5}"#] {
        let storage = MemoryStorage::new();
        storage.insert_raw("cart", payload);

        let strict = CartService::open_with_config(
            storage.clone(),
            StoreConfig::default().with_corrupt_policy(CorruptSnapshotPolicy::Reject),
        );
        match strict.err().unwrap() {
            StoreError::CorruptSnapshot { reason, .. } => {
                assert!(reason.contains("more than once"), "reason: {reason}")
            }
            other => panic!("unexpected error: {other}"),
        }

        let lenient = CartService::open(storage).unwrap();
        assert!(matches!(lenient.load_outcome(), LoadOutcome::Recovered { .. }));
    }
}

#[test]
fn restored_payload_is_rewritten_in_canonical_form() {
    let storage = MemoryStorage::new();
    storage.insert_raw("cart", r#"{ " book-1 " : 2 }"#);

    let cart = CartService::open(storage.clone()).unwrap();
    assert_eq!(cart.load_outcome(), &LoadOutcome::Restored);
    assert_eq!(storage.raw("cart").as_deref(), Some(r#"{"book-1":2}"#));
}
