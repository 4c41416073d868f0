//! Schema inspection against real SQLite database files.

mod common;

use common::{USERS_SCHEMA, sqlite_db};
use serde_json::json;
use table_checker::db::{SchemaInspector, SqlxConnectionProvider};
use table_checker::models::{ColumnDescriptor, ConnectionParams};

#[tokio::test]
async fn test_users_table_snapshot() {
    let (_file, provider) = sqlite_db(USERS_SCHEMA).await;

    let snapshot = SchemaInspector::read_schema(&provider).await.unwrap();

    assert_eq!(snapshot.total_tables(), 1);
    let users = snapshot.table("users").unwrap();
    assert_eq!(users.row_count, 3);
    assert_eq!(
        users.columns,
        vec![
            ColumnDescriptor::new("id", "int", false),
            ColumnDescriptor::new("name", "text", true).with_default("'anon'"),
        ]
    );
    assert_eq!(
        serde_json::to_value(&users.columns).unwrap(),
        json!([
            {"name": "id", "type": "int", "nullable": false, "default": null},
            {"name": "name", "type": "text", "nullable": true, "default": "'anon'"},
        ])
    );
}

#[tokio::test]
async fn test_declared_types_are_lower_case() {
    let (_file, provider) = sqlite_db(&[
        "CREATE TABLE products (sku VARCHAR(20) NOT NULL, price Numeric(10, 2), blob_col BLOB)",
    ])
    .await;

    let snapshot = SchemaInspector::read_schema(&provider).await.unwrap();
    let types: Vec<&str> = snapshot
        .table("products")
        .unwrap()
        .columns
        .iter()
        .map(|c| c.data_type.as_str())
        .collect();

    assert_eq!(types, vec!["varchar(20)", "numeric(10, 2)", "blob"]);
}

#[tokio::test]
async fn test_empty_database() {
    let (_file, provider) = sqlite_db(&[]).await;

    let snapshot = SchemaInspector::read_schema(&provider).await.unwrap();

    assert_eq!(snapshot.total_tables(), 0);
    assert!(snapshot.tables().is_empty());
}

#[tokio::test]
async fn test_tables_are_sorted_by_name() {
    let (_file, provider) = sqlite_db(&[
        "CREATE TABLE orders (id INTEGER)",
        "CREATE TABLE accounts (id INTEGER)",
        "CREATE TABLE Zebra (id INTEGER)",
        "CREATE TABLE line_items (id INTEGER)",
    ])
    .await;

    let snapshot = SchemaInspector::read_schema(&provider).await.unwrap();
    let names: Vec<&str> = snapshot.table_names().collect();

    assert_eq!(names, vec!["Zebra", "accounts", "line_items", "orders"]);
}

#[tokio::test]
async fn test_internal_tables_and_views_are_skipped() {
    let (_file, provider) = sqlite_db(&[
        "CREATE TABLE events (id INTEGER PRIMARY KEY AUTOINCREMENT, kind TEXT NOT NULL)",
        "INSERT INTO events (kind) VALUES ('login')",
        "CREATE VIEW logins AS SELECT * FROM events WHERE kind = 'login'",
        "CREATE INDEX idx_events_kind ON events (kind)",
    ])
    .await;

    let snapshot = SchemaInspector::read_schema(&provider).await.unwrap();
    let names: Vec<&str> = snapshot.table_names().collect();

    // AUTOINCREMENT creates sqlite_sequence behind the scenes
    assert_eq!(names, vec!["events"]);
    assert_eq!(snapshot.table("events").unwrap().row_count, 1);
}

#[tokio::test]
async fn test_awkward_table_names_are_counted() {
    let (_file, provider) = sqlite_db(&[
        r#"CREATE TABLE "we""ird" (id INTEGER)"#,
        r#"INSERT INTO "we""ird" VALUES (1), (2)"#,
        r#"CREATE TABLE "select" (id INTEGER)"#,
        r#"INSERT INTO "select" VALUES (1)"#,
        r#"CREATE TABLE "with space" (id INTEGER)"#,
    ])
    .await;

    let snapshot = SchemaInspector::read_schema(&provider).await.unwrap();

    assert_eq!(snapshot.table("we\"ird").unwrap().row_count, 2);
    assert_eq!(snapshot.table("select").unwrap().row_count, 1);
    assert_eq!(snapshot.table("with space").unwrap().row_count, 0);
    assert_eq!(snapshot.table("we\"ird").unwrap().columns.len(), 1);
}

#[tokio::test]
async fn test_repeated_reads_are_identical() {
    let (_file, provider) = sqlite_db(USERS_SCHEMA).await;

    let first = SchemaInspector::read_schema(&provider).await.unwrap();
    let second = SchemaInspector::read_schema(&provider).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_reads_see_new_rows() {
    let (file, provider) = sqlite_db(USERS_SCHEMA).await;
    let before = SchemaInspector::read_schema(&provider).await.unwrap();

    let path = file.path().to_str().unwrap();
    let url = format!("sqlite:{}", path);
    let mut writer = <sqlx::SqliteConnection as sqlx::Connection>::connect(&url)
        .await
        .unwrap();
    sqlx::query("INSERT INTO users (id) VALUES (4)")
        .execute(&mut writer)
        .await
        .unwrap();
    sqlx::Connection::close(writer).await.unwrap();

    let after = SchemaInspector::read_schema(&provider).await.unwrap();
    assert_eq!(before.table("users").unwrap().row_count, 3);
    assert_eq!(after.table("users").unwrap().row_count, 4);
}

#[tokio::test]
async fn test_missing_file_is_a_connection_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.db");
    let provider =
        SqlxConnectionProvider::new(ConnectionParams::sqlite(path.to_str().unwrap()));

    let err = SchemaInspector::read_schema(&provider).await.unwrap_err();

    assert!(err.is_connectivity(), "unexpected error: {err:?}");
    assert!(!path.exists(), "inspection must not create the database file");
}
