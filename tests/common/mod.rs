//! Shared helpers for integration tests.

#![allow(dead_code)]

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use table_checker::db::{ConnectionProvider, SchemaCatalog, SqlxConnectionProvider, TableIdent};
use table_checker::error::{DbError, DbResult};
use table_checker::models::{ColumnDescriptor, ConnectionParams};
use tempfile::NamedTempFile;

/// Create a SQLite database file, run `statements` against it and return a
/// provider pointing at it. Keep the returned file alive for the test.
pub async fn sqlite_db(statements: &[&str]) -> (NamedTempFile, SqlxConnectionProvider) {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_str().unwrap().to_string();

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    for sql in statements {
        sqlx::query(sql)
            .execute(&mut conn)
            .await
            .unwrap_or_else(|e| panic!("setup statement failed: {sql}: {e}"));
    }
    conn.close().await.unwrap();

    (temp_file, SqlxConnectionProvider::new(ConnectionParams::sqlite(path)))
}

/// Schema from the `users` example: two columns, three rows.
pub const USERS_SCHEMA: &[&str] = &[
    "CREATE TABLE users (id int not null, name text null default 'anon')",
    "INSERT INTO users (id, name) VALUES (1, 'ada')",
    "INSERT INTO users (id) VALUES (2)",
    "INSERT INTO users (id, name) VALUES (3, NULL)",
];

/// Counters shared between a [`CountingProvider`] and the test.
#[derive(Debug, Default)]
pub struct Calls {
    pub opens: AtomicUsize,
    pub queries: AtomicUsize,
    pub closes: AtomicUsize,
}

impl Calls {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Provider with a scripted catalog that counts every call.
pub struct CountingProvider {
    pub calls: Arc<Calls>,
    pub reachable: bool,
    pub tables: Vec<(String, Vec<ColumnDescriptor>, u64)>,
    pub fail_columns_for: Option<String>,
}

impl CountingProvider {
    pub fn unreachable() -> Self {
        Self {
            calls: Arc::default(),
            reachable: false,
            tables: Vec::new(),
            fail_columns_for: None,
        }
    }

    pub fn with_tables(tables: Vec<(&str, Vec<ColumnDescriptor>, u64)>) -> Self {
        Self {
            calls: Arc::default(),
            reachable: true,
            tables: tables
                .into_iter()
                .map(|(n, c, r)| (n.to_string(), c, r))
                .collect(),
            fail_columns_for: None,
        }
    }
}

pub struct CountingCatalog {
    calls: Arc<Calls>,
    tables: Vec<(String, Vec<ColumnDescriptor>, u64)>,
    fail_columns_for: Option<String>,
}

impl CountingCatalog {
    fn lookup(&self, table: &TableIdent) -> DbResult<&(String, Vec<ColumnDescriptor>, u64)> {
        self.tables
            .iter()
            .find(|(n, _, _)| n == table.name())
            .ok_or_else(|| DbError::query("relation does not exist", Some("42P01".into())))
    }
}

impl SchemaCatalog for CountingCatalog {
    async fn list_tables(&mut self) -> DbResult<Vec<String>> {
        self.calls.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables.iter().map(|(n, _, _)| n.clone()).collect())
    }

    async fn fetch_columns(&mut self, table: &TableIdent) -> DbResult<Vec<ColumnDescriptor>> {
        self.calls.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_columns_for.as_deref() == Some(table.name()) {
            return Err(DbError::query(
                format!("relation \"{}\" does not exist", table.name()),
                Some("42P01".into()),
            ));
        }
        Ok(self.lookup(table)?.1.clone())
    }

    async fn count_rows(&mut self, table: &TableIdent) -> DbResult<u64> {
        self.calls.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.lookup(table)?.2)
    }

    async fn close(self) {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
    }
}

impl ConnectionProvider for CountingProvider {
    type Connection = CountingCatalog;

    async fn open(&self) -> DbResult<CountingCatalog> {
        self.calls.opens.fetch_add(1, Ordering::SeqCst);
        if !self.reachable {
            return Err(DbError::connection(
                "could not connect to server: Connection refused (password=hunter2)",
                "Check network connectivity and database server status",
            ));
        }
        Ok(CountingCatalog {
            calls: self.calls.clone(),
            tables: self.tables.clone(),
            fail_columns_for: self.fail_columns_for.clone(),
        })
    }
}
