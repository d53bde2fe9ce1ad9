#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use qtool_core::config::{CLUSTER_SECTION, ConfigStore};
use qtool_core::Error;
use tempfile::tempdir;

#[test]
fn read_after_write_returns_new_value() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::open(dir.path().join(".configs.ini"));

    store.set(CLUSTER_SECTION, "address", "host1").unwrap();
    assert_eq!(store.get(CLUSTER_SECTION, "address", "x"), "host1");

    store.set(CLUSTER_SECTION, "address", "host2").unwrap();
    assert_eq!(store.get(CLUSTER_SECTION, "address", "x"), "host2");
}

#[test]
fn missing_section_returns_default_on_empty_store() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::open(dir.path().join(".configs.ini"));

    assert_eq!(store.get("MISSING", "key", "fallback"), "fallback");
    assert_eq!(store.get_opt("MISSING", "key"), None);
    assert!(store.section("MISSING").is_empty());
}

#[test]
fn file_is_created_lazily_in_ini_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join(".configs.ini");
    let store = ConfigStore::open(&path);
    assert!(!path.exists());

    store
        .set_many(
            CLUSTER_SECTION,
            &[
                ("address", "127.0.0.1:8091"),
                ("username", "Administrator"),
                ("password", "s3cret"),
            ],
        )
        .unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents,
        "[CLUSTER]\naddress=127.0.0.1:8091\nusername=Administrator\npassword=s3cret\n\n"
    );
}

#[test]
fn writes_leave_only_the_lock_file_behind() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::open(dir.path().join(".configs.ini"));
    store.set(CLUSTER_SECTION, "format", "csv").unwrap();
    store.set(CLUSTER_SECTION, "scope", "b.s").unwrap();

    assert!(!dir.path().join(".configs.ini.tmp").exists());
    assert!(dir.path().join(".configs.ini.lock").exists());

    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec![".configs.ini", ".configs.ini.lock"]);
}

#[test]
fn value_with_line_break_is_refused_and_store_stays_usable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".configs.ini");
    let store = ConfigStore::open(&path);
    store.set(CLUSTER_SECTION, "address", "host1").unwrap();
    let before = fs::read_to_string(&path).unwrap();

    for value in ["pa\nss", "pa\r\nss", "pass\n"] {
        let err = store.set(CLUSTER_SECTION, "password", value).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("line break")));
    }

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert_eq!(store.get(CLUSTER_SECTION, "address", "DEFAULT"), "host1");
    store.set(CLUSTER_SECTION, "username", "admin").unwrap();
    assert_eq!(store.get(CLUSTER_SECTION, "username", ""), "admin");
}

#[test]
fn padded_value_is_refused_rather_than_trimmed() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::open(dir.path().join(".configs.ini"));
    store.set(CLUSTER_SECTION, "password", "pw").unwrap();

    let err = store.set(CLUSTER_SECTION, "password", " pw ").unwrap_err();
    assert!(matches!(err, Error::Config(ref msg) if msg.contains("whitespace")));
    assert_eq!(store.get(CLUSTER_SECTION, "password", ""), "pw");

    store.set(CLUSTER_SECTION, "password", "p w=x:y").unwrap();
    assert_eq!(store.get(CLUSTER_SECTION, "password", ""), "p w=x:y");
}

#[test]
fn key_with_delimiter_is_refused() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::open(dir.path().join(".configs.ini"));

    for key in ["a=b", "a:b", "#a", " a"] {
        assert!(matches!(
            store.set(CLUSTER_SECTION, key, "v").unwrap_err(),
            Error::Config(_)
        ));
    }
    assert!(!store.path().exists());
}

#[test]
fn batch_with_one_bad_value_writes_nothing() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::open(dir.path().join(".configs.ini"));

    let err = store
        .set_many(
            CLUSTER_SECTION,
            &[("address", "host1"), ("password", "pa\nss")],
        )
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!store.path().exists());
    assert_eq!(store.get(CLUSTER_SECTION, "address", "DEFAULT"), "DEFAULT");
}

#[test]
fn other_sections_and_hand_edits_survive_a_write() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".configs.ini");
    fs::write(
        &path,
        "# edited by hand\n[PROFILE]\nname = staging\n\n[CLUSTER]\nUsername: ops\n",
    )
    .unwrap();

    let store = ConfigStore::open(&path);
    store.set(CLUSTER_SECTION, "address", "10.0.0.9").unwrap();

    assert_eq!(store.get("PROFILE", "name", ""), "staging");
    assert_eq!(store.get(CLUSTER_SECTION, "username", ""), "ops");
    assert_eq!(store.get(CLUSTER_SECTION, "address", ""), "10.0.0.9");
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[PROFILE]\nname=staging\n\n[CLUSTER]\nusername=ops\naddress=10.0.0.9\n\n"
    );
}

#[test]
fn corrupt_file_reads_softly_but_is_never_overwritten() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".configs.ini");
    fs::write(&path, "address=outside-any-section\n").unwrap();

    let store = ConfigStore::open(&path);
    assert_eq!(store.get(CLUSTER_SECTION, "address", "default"), "default");

    let err = store.set(CLUSTER_SECTION, "address", "h").unwrap_err();
    assert!(matches!(err, Error::Config(ref msg) if msg.contains("refusing to overwrite")));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "address=outside-any-section\n"
    );
}

#[test]
fn unset_removes_key_and_reports_presence() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::open(dir.path().join(".configs.ini"));
    store
        .set_many(CLUSTER_SECTION, &[("scope", "b.s"), ("collection", "c")])
        .unwrap();

    assert!(store.unset(CLUSTER_SECTION, "scope").unwrap());
    assert!(!store.unset(CLUSTER_SECTION, "scope").unwrap());
    assert_eq!(
        store.section(CLUSTER_SECTION),
        vec![("collection".to_string(), "c".to_string())]
    );
}

#[test]
fn separate_handles_observe_each_other() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".configs.ini");
    let writer = ConfigStore::open(&path);
    let reader = ConfigStore::open(&path);

    writer.set(CLUSTER_SECTION, "username", "alice").unwrap();
    assert_eq!(reader.get(CLUSTER_SECTION, "username", ""), "alice");
}

#[test]
fn concurrent_writers_do_not_lose_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".configs.ini");

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = ConfigStore::open(&path);
            std::thread::spawn(move || {
                store
                    .set(CLUSTER_SECTION, &format!("key{i}"), &i.to_string())
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let store = ConfigStore::open(&path);
    for i in 0..8 {
        assert_eq!(store.get(CLUSTER_SECTION, &format!("key{i}"), ""), i.to_string());
    }
}
