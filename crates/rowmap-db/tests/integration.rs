use std::time::Duration;

use rowmap_db::{open_pool, ConnectionProvider, PoolError, PoolSettings, Storage};
use tempfile::TempDir;

#[test]
fn file_storage_persists_across_pools() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("library.db");

    {
        let pool = open_pool(&Storage::File(path.clone()), &PoolSettings::default())
            .expect("failed to open pool");
        let conn = pool.connection().expect("failed to get connection");
        conn.execute_batch(
            "CREATE TABLE author (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);
             INSERT INTO author (name) VALUES ('Jane Austen');",
        )
        .expect("failed to seed author table");
    }

    let pool = open_pool(&Storage::File(path), &PoolSettings::default())
        .expect("failed to reopen pool");
    let conn = pool.connection().expect("failed to get connection");
    let name: String = conn
        .query_row("SELECT name FROM author WHERE id = 1", [], |row| row.get(0))
        .expect("failed to read author");
    assert_eq!(name, "Jane Austen");

    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .expect("failed to query journal mode");
    assert_eq!(mode, "wal");
}

#[test]
fn unreachable_file_storage_reports_its_path() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let storage = Storage::File(dir.path().join("missing").join("library.db"));

    let settings = PoolSettings {
        acquire_timeout: Duration::from_millis(200),
        ..PoolSettings::default()
    };

    let err = open_pool(&storage, &settings).expect_err("open should fail");
    let PoolError::Open { storage: failed, .. } = &err;
    assert_eq!(failed, &storage);
    assert!(err.to_string().contains("library.db"), "{err}");
}
