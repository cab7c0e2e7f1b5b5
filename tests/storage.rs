mod common;

use common::TestWorkspace;
use tabular_digest::{FileStore, IngestError};

#[test]
fn list_is_sorted_and_skips_foreign_files() {
    let workspace = TestWorkspace::new();
    let store = workspace.store();
    let first = store.save(b"a\n1\n", "b.csv").expect("save");
    let second = store.save(b"PK", "a.xlsx").expect("save");
    std::fs::write(store.root().join("notes.txt"), "ignored").expect("write");
    std::fs::create_dir(store.root().join("nested.csv")).expect("dir");

    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(store.list().expect("list"), expected);
}

#[test]
fn list_of_missing_directory_is_empty() {
    let workspace = TestWorkspace::new();
    assert!(workspace.store().list().expect("list").is_empty());
}

#[test]
fn saving_the_same_name_twice_keeps_both() {
    let workspace = TestWorkspace::new();
    let store = workspace.store();
    let one = store.save(b"x\n1\n", "same.csv").expect("save");
    let two = store.save(b"x\n2\n", "same.csv").expect("save");
    assert_ne!(one, two);
    assert_eq!(store.read(&one).expect("read"), b"x\n1\n");
    assert_eq!(store.read(&two).expect("read"), b"x\n2\n");
}

#[test]
fn delete_removes_and_then_reports_not_found() {
    let workspace = TestWorkspace::new();
    let store = workspace.store();
    let stored = store.save(b"a\n1\n", "gone.csv").expect("save");
    store.delete(&stored).expect("delete");
    assert!(!store.exists(&stored));
    let err = store.delete(&stored).unwrap_err();
    assert!(matches!(err, IngestError::NotFound { .. }));
}

#[test]
fn names_cannot_escape_the_store_root() {
    let workspace = TestWorkspace::new();
    let outside = workspace.write("secret.csv", "a\n1\n");
    let store = workspace.store();
    std::fs::create_dir_all(store.root()).expect("store dir");

    assert!(!store.exists("../secret.csv"));
    assert!(matches!(
        store.read("../secret.csv"),
        Err(IngestError::NotFound { .. })
    ));
    assert!(outside.exists());

    let stored = store.save(b"a\n1\n", "../../escape.csv").expect("save");
    assert!(stored.ends_with("_escape.csv"));
    assert!(store.root().join(&stored).is_file());
}
