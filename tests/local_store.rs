use soffice_relay::{
    error::StorageError,
    storage::{LocalObjectStore, ObjectStore, validate_key},
};

#[test]
fn upload_then_download() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(root.path());

    let src = scratch.path().join("doc.pdf");
    std::fs::write(&src, b"%PDF-1.7").unwrap();
    store.upload(&src, "out", "reports/2024/doc.pdf").unwrap();
    assert!(root.path().join("out/reports/2024/doc.pdf").is_file());

    let back = scratch.path().join("copy.pdf");
    store.download("out", "reports/2024/doc.pdf", &back).unwrap();
    assert_eq!(std::fs::read(back).unwrap(), b"%PDF-1.7");
}

#[test]
fn upload_replaces_existing_object() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(root.path());
    let src = scratch.path().join("doc.txt");

    std::fs::write(&src, b"one").unwrap();
    store.upload(&src, "b", "doc.txt").unwrap();
    std::fs::write(&src, b"two").unwrap();
    store.upload(&src, "b", "doc.txt").unwrap();

    assert_eq!(std::fs::read(root.path().join("b/doc.txt")).unwrap(), b"two");
    assert_eq!(std::fs::read_dir(root.path().join("b")).unwrap().count(), 1);
}

#[test]
fn missing_object_is_not_found() {
    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(root.path());

    let err = store
        .download("b", "missing.docx", &scratch.path().join("x"))
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[test]
fn traversal_keys_are_rejected() {
    for key in ["", "/etc/passwd", "../x", "a/../../x", "a//b", "./a"] {
        assert!(
            matches!(validate_key(key), Err(StorageError::InvalidKey { .. })),
            "key {key:?} accepted"
        );
    }
    assert!(validate_key("a/b/c.pdf").is_ok());

    let root = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(root.path());
    let err = store
        .download("..", "x.txt", &scratch.path().join("x"))
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidKey { .. }));
}
