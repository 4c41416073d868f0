//! Schema introspection module.
//!
//! This module reads the catalog of SQLite, PostgreSQL, and MySQL databases
//! and assembles a [`SchemaSnapshot`].
//!
//! # Architecture
//!
//! SQL queries are organized in the `queries` submodule with constants for each
//! database type. Database-specific implementations are in their respective
//! submodules (postgres, mysql, sqlite), each providing the same interface.
//! [`SchemaInspector`] only talks to the [`SchemaCatalog`] trait, so the
//! algorithm is the same for every backend.

use crate::db::connection::{ConnectionProvider, DbConnection, SchemaCatalog};
use crate::db::ident::{KnownTables, QuoteStyle, TableIdent};
use crate::error::DbResult;
use crate::models::{ColumnDescriptor, SchemaSnapshot, TableDescriptor};
use tracing::{debug, info};

/// Schema inspector for database introspection.
pub struct SchemaInspector;

impl SchemaInspector {
    /// Take a snapshot of the schema behind `provider`.
    ///
    /// The connection is opened, used and closed within this call, on every
    /// exit path. If no connection can be opened no catalog query is issued.
    pub async fn read_schema<P: ConnectionProvider>(provider: &P) -> DbResult<SchemaSnapshot> {
        let mut conn = provider.open().await?;
        let result = Self::inspect(&mut conn).await;
        conn.close().await;
        result
    }

    /// Take a snapshot over an already open catalog.
    ///
    /// Either every table is fully described or the whole call fails.
    pub async fn inspect<C: SchemaCatalog>(catalog: &mut C) -> DbResult<SchemaSnapshot> {
        let mut names = catalog.list_tables().await?;
        names.sort();
        names.dedup();

        let known = KnownTables::from_catalog(names.iter().cloned());
        let mut tables = Vec::with_capacity(names.len());

        for name in &names {
            let ident = known.resolve(name)?;
            let columns = catalog.fetch_columns(&ident).await?;
            let row_count = catalog.count_rows(&ident).await?;
            debug!(
                table = %name,
                columns = columns.len(),
                row_count,
                "Described table"
            );
            tables.push(TableDescriptor::new(name.as_str(), columns, row_count));
        }

        let snapshot = SchemaSnapshot::new(tables);
        info!(tables = snapshot.total_tables(), "Schema snapshot complete");
        Ok(snapshot)
    }
}

impl SchemaCatalog for DbConnection {
    async fn list_tables(&mut self) -> DbResult<Vec<String>> {
        match self {
            DbConnection::Postgres { conn, namespace } => {
                postgres::list_tables(conn, namespace).await
            }
            DbConnection::MySql(conn) => mysql::list_tables(conn).await,
            DbConnection::SQLite(conn) => sqlite::list_tables(conn).await,
        }
    }

    async fn fetch_columns(&mut self, table: &TableIdent) -> DbResult<Vec<ColumnDescriptor>> {
        match self {
            DbConnection::Postgres { conn, namespace } => {
                postgres::fetch_columns(conn, namespace, table).await
            }
            DbConnection::MySql(conn) => mysql::fetch_columns(conn, table).await,
            DbConnection::SQLite(conn) => sqlite::fetch_columns(conn, table).await,
        }
    }

    async fn count_rows(&mut self, table: &TableIdent) -> DbResult<u64> {
        match self {
            DbConnection::Postgres { conn, namespace } => {
                postgres::count_rows(conn, namespace, table).await
            }
            DbConnection::MySql(conn) => mysql::count_rows(conn, table).await,
            DbConnection::SQLite(conn) => sqlite::count_rows(conn, table).await,
        }
    }

    async fn close(self) {
        self.shutdown().await;
    }
}

/// Exact count statement for an already quoted table reference.
fn count_statement(quoted_table: &str) -> String {
    format!("SELECT COUNT(*) AS row_count FROM {}", quoted_table)
}

// =============================================================================
// SQL Query Templates
// =============================================================================
//
// Centralized SQL queries for schema introspection. Each database has its own
// submodule with queries adapted to its specific system catalogs. Table names
// are always bound as parameters here; only the count query above needs the
// quoted identifier.

mod queries {
    pub mod postgres {
        pub const LIST_TABLES: &str = r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = $1
            AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#;

        pub const DESCRIBE_COLUMNS: &str = r#"
            SELECT
                column_name::text AS column_name,
                data_type::text AS data_type,
                is_nullable::text AS is_nullable,
                column_default::text AS column_default
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
            "#;
    }

    pub mod mysql {
        pub const LIST_TABLES: &str = r#"
            SELECT CONVERT(TABLE_NAME USING utf8) AS TABLE_NAME
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = DATABASE()
            AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
            "#;

        pub const DESCRIBE_COLUMNS: &str = r#"
            SELECT
                CONVERT(COLUMN_NAME USING utf8) AS COLUMN_NAME,
                CONVERT(DATA_TYPE USING utf8) AS DATA_TYPE,
                CONVERT(IS_NULLABLE USING utf8) AS IS_NULLABLE,
                CONVERT(COLUMN_DEFAULT USING utf8) AS COLUMN_DEFAULT
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
            "#;
    }

    pub mod sqlite {
        pub const LIST_TABLES: &str = r#"
            SELECT name FROM sqlite_master
            WHERE type = 'table'
            AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#;

        pub const DESCRIBE_COLUMNS: &str = r#"
            SELECT name, type, "notnull" AS not_null, dflt_value
            FROM pragma_table_info(?1)
            ORDER BY cid
            "#;
    }
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================

mod postgres {
    use super::*;
    use sqlx::{PgConnection, Row};

    pub async fn list_tables(conn: &mut PgConnection, namespace: &str) -> DbResult<Vec<String>> {
        let rows = sqlx::query(queries::postgres::LIST_TABLES)
            .bind(namespace)
            .fetch_all(&mut *conn)
            .await?;

        let tables = rows
            .iter()
            .map(|row| row.try_get::<String, _>("table_name"))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            count = tables.len(),
            schema = namespace,
            "Listed PostgreSQL tables"
        );
        Ok(tables)
    }

    pub async fn fetch_columns(
        conn: &mut PgConnection,
        namespace: &str,
        table: &TableIdent,
    ) -> DbResult<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(queries::postgres::DESCRIBE_COLUMNS)
            .bind(namespace)
            .bind(table.name())
            .fetch_all(&mut *conn)
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.try_get("column_name")?;
            let data_type: String = row.try_get("data_type")?;
            let nullable: String = row.try_get("is_nullable")?;
            let default_value: Option<String> = row.try_get("column_default")?;

            let mut col = ColumnDescriptor::new(name, data_type, nullable == "YES");
            if let Some(def) = default_value {
                col = col.with_default(def);
            }
            columns.push(col);
        }
        Ok(columns)
    }

    pub async fn count_rows(
        conn: &mut PgConnection,
        namespace: &str,
        table: &TableIdent,
    ) -> DbResult<u64> {
        let sql = count_statement(&table.qualified(namespace, QuoteStyle::DoubleQuote));
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
        Ok(count.max(0) as u64)
    }
}

mod mysql {
    use super::*;
    use crate::error::DbError;
    use sqlx::{MySqlConnection, Row};

    /// Get a string from a MySQL row.
    /// MySQL may return VARBINARY instead of VARCHAR depending on charset configuration.
    fn get_string(row: &sqlx::mysql::MySqlRow, column: &str) -> DbResult<String> {
        if let Ok(value) = row.try_get::<String, _>(column) {
            return Ok(value);
        }
        let bytes: Vec<u8> = row.try_get(column)?;
        utf8_column(column, bytes)
    }

    /// Get an optional string from a MySQL row.
    fn get_optional_string(
        row: &sqlx::mysql::MySqlRow,
        column: &str,
    ) -> DbResult<Option<String>> {
        if let Ok(value) = row.try_get::<Option<String>, _>(column) {
            return Ok(value);
        }
        let bytes: Option<Vec<u8>> = row.try_get(column)?;
        bytes.map(|b| utf8_column(column, b)).transpose()
    }

    pub(super) fn utf8_column(column: &str, bytes: Vec<u8>) -> DbResult<String> {
        String::from_utf8(bytes).map_err(|e| {
            DbError::query(format!("Column {} is not valid UTF-8: {}", column, e), None)
        })
    }

    pub async fn list_tables(conn: &mut MySqlConnection) -> DbResult<Vec<String>> {
        let rows = sqlx::query(queries::mysql::LIST_TABLES)
            .fetch_all(&mut *conn)
            .await?;

        let tables = rows
            .iter()
            .map(|row| get_string(row, "TABLE_NAME"))
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = tables.len(), "Listed MySQL tables");
        Ok(tables)
    }

    pub async fn fetch_columns(
        conn: &mut MySqlConnection,
        table: &TableIdent,
    ) -> DbResult<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(queries::mysql::DESCRIBE_COLUMNS)
            .bind(table.name())
            .fetch_all(&mut *conn)
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = get_string(row, "COLUMN_NAME")?;
            let data_type = get_string(row, "DATA_TYPE")?;
            let nullable = get_string(row, "IS_NULLABLE")?;

            let mut col = ColumnDescriptor::new(name, data_type, nullable == "YES");
            if let Some(def) = get_optional_string(row, "COLUMN_DEFAULT")? {
                col = col.with_default(def);
            }
            columns.push(col);
        }
        Ok(columns)
    }

    pub async fn count_rows(conn: &mut MySqlConnection, table: &TableIdent) -> DbResult<u64> {
        let sql = count_statement(&table.quoted(QuoteStyle::Backtick));
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
        Ok(count.max(0) as u64)
    }
}

mod sqlite {
    use super::*;
    use sqlx::{Row, SqliteConnection};

    pub async fn list_tables(conn: &mut SqliteConnection) -> DbResult<Vec<String>> {
        let rows = sqlx::query(queries::sqlite::LIST_TABLES)
            .fetch_all(&mut *conn)
            .await?;

        let tables = rows
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = tables.len(), "Listed SQLite tables");
        Ok(tables)
    }

    pub async fn fetch_columns(
        conn: &mut SqliteConnection,
        table: &TableIdent,
    ) -> DbResult<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(queries::sqlite::DESCRIBE_COLUMNS)
            .bind(table.name())
            .fetch_all(&mut *conn)
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.try_get("name")?;
            let data_type: String = row.try_get("type")?;
            let not_null: i64 = row.try_get("not_null")?;
            let default_value: Option<String> = row.try_get("dflt_value")?;

            // Declared type case varies by SQLite build; report lower case like PostgreSQL
            let mut col = ColumnDescriptor::new(name, data_type.to_lowercase(), not_null == 0);
            if let Some(def) = default_value {
                col = col.with_default(def);
            }
            columns.push(col);
        }
        Ok(columns)
    }

    pub async fn count_rows(conn: &mut SqliteConnection, table: &TableIdent) -> DbResult<u64> {
        let sql = count_statement(&table.quoted(QuoteStyle::DoubleQuote));
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
        Ok(count.max(0) as u64)
    }
}
