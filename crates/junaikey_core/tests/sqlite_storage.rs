use junaikey_core::storage::migrations::latest_version;
use junaikey_core::storage::PROGRESSION_NAMESPACE;
use junaikey_core::{
    AppConfig, AppContext, NoteDraft, SqliteStorage, StorageError, StoragePort, SyncStatus,
};
use rusqlite::Connection;

#[test]
fn in_memory_storage_applies_all_migrations() {
    let storage = SqliteStorage::open_in_memory().unwrap();

    assert_eq!(storage.schema_version().unwrap(), latest_version());
    assert_eq!(storage.get("missing").unwrap(), None);
}

#[test]
fn set_overwrites_and_remove_deletes() {
    let storage = SqliteStorage::open_in_memory().unwrap();

    storage.set("junaikey.notes", r#"{"notes":[]}"#).unwrap();
    storage.set("junaikey.notes", r#"{"notes":[1]}"#).unwrap();
    assert_eq!(
        storage.get("junaikey.notes").unwrap().as_deref(),
        Some(r#"{"notes":[1]}"#)
    );

    storage.remove("junaikey.notes").unwrap();
    assert_eq!(storage.get("junaikey.notes").unwrap(), None);
    // Removing an absent key is not an error.
    storage.remove("junaikey.notes").unwrap();
}

#[test]
fn documents_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("junaikey.sqlite3");

    let first = SqliteStorage::open(&path).unwrap();
    first.set(PROGRESSION_NAMESPACE, "{}").unwrap();
    drop(first);

    let second = SqliteStorage::open(&path).unwrap();
    assert_eq!(second.schema_version().unwrap(), latest_version());
    assert_eq!(
        second.get(PROGRESSION_NAMESPACE).unwrap().as_deref(),
        Some("{}")
    );
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = SqliteStorage::open(&path).err().unwrap();
    match err {
        StorageError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn file_config(dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.db_path = dir.join("junaikey.sqlite3").display().to_string();
    config.remote.latency_min_ms = 0;
    config.remote.latency_max_ms = 0;
    config.remote.seed_examples = false;
    config
}

#[test]
fn context_state_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());

    let note_id = {
        let context = AppContext::open(&config).unwrap();
        context.select_profession("sage").unwrap();
        context.add_exp("light", 100).unwrap();
        context
            .add_note(NoteDraft::new("kept", "on disk"))
            .unwrap()
            .id
    };

    let context = AppContext::open(&config).unwrap();
    let state = context.progression_snapshot();
    let light = state.spirits.iter().find(|s| s.id == "light").unwrap();
    // 100 * 2.0 = 200 from level 1
    assert_eq!((light.level, light.exp), (2, 100));
    assert_eq!(state.selected_profession_id.as_deref(), Some("sage"));
    assert_eq!(context.notes_snapshot()[0].id, note_id);
}

#[tokio::test]
async fn context_sync_round_trips_through_sqlite_remote() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());

    {
        let context = AppContext::open(&config).unwrap();
        context.add_note(NoteDraft::new("shared", "")).unwrap();
        let outcome = context.sync_with_boost_space().await;
        assert!(outcome.is_completed());
        assert_eq!(context.sync_state().status, SyncStatus::Success);
    }

    // A fresh context sees the pushed note as already synced.
    let context = AppContext::open(&config).unwrap();
    assert!(context.notes_snapshot()[0].boost_space_id.is_some());
    let outcome = context.sync_with_boost_space().await;
    let report = outcome.report().unwrap();
    assert_eq!((report.pushed(), report.pulled()), (0, 0));
    assert!(context.sync_state().last_synced_at.is_some());
}
