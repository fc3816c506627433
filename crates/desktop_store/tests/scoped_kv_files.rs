use std::fs;

use desktop_store::{read_backup_file, write_backup_file, HostStoreError, ScopedKvFileStore};
use platform_host::{HostErrorKind, LogicalKey};
use serde_json::json;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> ScopedKvFileStore {
    ScopedKvFileStore::from_root(dir.path().join("store")).expect("init store")
}

#[test]
fn missing_file_reads_as_no_value() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    assert_eq!(store.read("edugen_leaderboard").expect("read"), None);
}

#[test]
fn logical_keys_map_to_table_file_names() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    store
        .write(LogicalKey::Exams.as_str(), &json!([{"id": 1}]))
        .expect("write exams");
    assert!(store.root().join("exams.json").is_file());
    assert_eq!(
        store.path_for("edugen_api_key").expect("path"),
        store.root().join("api_key.json")
    );
    assert_eq!(
        store.read(LogicalKey::Exams.as_str()).expect("read"),
        Some(json!([{"id": 1}]))
    );
}

#[test]
fn unmapped_key_uses_key_named_file() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    store
        .write("custom_key_not_in_table", &json!([1, 2, 3]))
        .expect("write");
    let path = store.root().join("custom_key_not_in_table.json");
    assert!(path.is_file());
    assert_eq!(
        store.read("custom_key_not_in_table").expect("read"),
        Some(json!([1, 2, 3]))
    );
    assert_eq!(
        store.keys_on_disk().expect("list"),
        vec!["custom_key_not_in_table".to_string()]
    );
}

#[test]
fn writes_are_indented_and_replace_prior_content() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    store
        .write("edugen_settings", &json!({"schoolName": "X", "grade": 7}))
        .expect("first write");
    store
        .write("edugen_settings", &json!({"schoolName": "Y"}))
        .expect("second write");

    let raw = fs::read_to_string(store.root().join("settings.json")).expect("raw file");
    assert_eq!(raw, "{\n  \"schoolName\": \"Y\"\n}");
}

#[test]
fn corrupt_file_is_a_parse_error_with_parse_payload() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    let path = store.root().join("vocab.json");
    fs::write(&path, "[{\"word\":").expect("write corrupt file");

    let err = store.read("edugen_vocab_bank").expect_err("corrupt");
    assert!(
        err.to_string()
            .starts_with(&format!("failed to parse {}:", path.display())),
        "unexpected error: {err}"
    );
    let payload = err.to_payload();
    assert_eq!(payload.kind, HostErrorKind::Parse);
    assert_eq!(payload.key, "edugen_vocab_bank");

    store
        .write("edugen_vocab_bank", &json!([]))
        .expect("overwrite corrupt file");
    assert_eq!(store.read("edugen_vocab_bank").expect("read"), Some(json!([])));
}

#[test]
fn keys_on_disk_reports_storage_keys() {
    let dir = TempDir::new().expect("temp dir");
    let store = store_in(&dir);
    store.write("edugen_settings", &json!({})).expect("write");
    store
        .write("edugen_speaking_topic_bank", &json!([]))
        .expect("write");
    fs::write(store.root().join("notes.txt"), "ignored").expect("write other file");
    assert_eq!(
        store.keys_on_disk().expect("list"),
        vec![
            "edugen_settings".to_string(),
            "edugen_speaking_topic_bank".to_string()
        ]
    );
}

#[test]
fn backup_files_round_trip_and_report_missing_parent() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("EduGen_Backup_2024-03-01.json");
    write_backup_file(&path, "{\"meta\":{},\"data\":{}}").expect("write backup");
    assert_eq!(
        read_backup_file(&path).expect("read backup"),
        "{\"meta\":{},\"data\":{}}"
    );

    let missing = dir.path().join("no_such_dir").join("backup.json");
    assert!(matches!(
        write_backup_file(&missing, "{}").expect_err("missing parent"),
        HostStoreError::Write { .. }
    ));
    assert!(matches!(
        read_backup_file(&missing).expect_err("missing file"),
        HostStoreError::Read { .. }
    ));
}

#[cfg(unix)]
#[test]
fn backup_files_get_ordinary_user_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().expect("temp dir");
    let reference = dir.path().join("reference.txt");
    fs::write(&reference, "x").expect("reference file");
    let expected = fs::metadata(&reference).expect("meta").permissions().mode() & 0o777;

    let path = dir.path().join("EduGen_Backup_2024-03-01.json");
    write_backup_file(&path, "{}").expect("write backup");
    let mode = fs::metadata(&path).expect("meta").permissions().mode() & 0o777;
    assert_eq!(mode, expected);

    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).expect("chmod");
    write_backup_file(&path, "{\"data\":{}}").expect("replace backup");
    let mode = fs::metadata(&path).expect("meta").permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
}
