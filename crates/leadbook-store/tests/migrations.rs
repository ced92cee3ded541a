use leadbook_store::Store;

#[test]
fn migrations_apply_once() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store.migrate().expect("migrate again");

    assert_eq!(store.schema_version().expect("schema version"), 1);
}

#[test]
fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("leadbook.sqlite3");

    {
        let store = Store::open(&path).expect("open");
        store.migrate().expect("migrate");
    }

    let store = Store::open(&path).expect("reopen");
    store.migrate().expect("migrate again");
    assert_eq!(store.schema_version().expect("schema version"), 1);
}
