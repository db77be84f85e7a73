//! Unit tests for the file configuration store.

use url::Url;

use super::*;

#[test]
fn writes_create_missing_parent_directories() {
    let dir = tempfile::tempdir().expect("temp dir");
    let location = ConfigLocation::path(dir.path().join("nested/deeper/adapter.json"));
    let store = FileConfigStore::new();

    store.write(&location, "{}").expect("write");
    assert_eq!(store.read(&location).expect("read"), "{}");
}

#[test]
fn file_urls_resolve_to_local_paths() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("adapter.yaml");
    let url = Url::from_file_path(&path).expect("absolute path");
    let store = FileConfigStore::new();

    store
        .write(&ConfigLocation::Url(url), "unique-id: a\n")
        .expect("write");
    assert_eq!(
        std::fs::read_to_string(&path).expect("read back"),
        "unique-id: a\n"
    );
}

#[test]
fn remote_urls_are_unsupported() {
    let location: ConfigLocation = "https://config.example.com/adapter.json"
        .parse()
        .expect("valid url");
    let error = FileConfigStore::new()
        .read(&location)
        .expect_err("remote locations are not readable");
    assert!(matches!(error, AdapterError::UnsupportedLocation { .. }));
}

#[test]
fn missing_documents_report_their_location() {
    let dir = tempfile::tempdir().expect("temp dir");
    let location = ConfigLocation::path(dir.path().join("absent.json"));
    let error = FileConfigStore::new()
        .read(&location)
        .expect_err("missing file");
    assert!(matches!(error, AdapterError::Io { .. }));
    assert!(error.to_string().contains("absent.json"));
}
